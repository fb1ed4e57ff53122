use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Content stored for a directory that has no entries at all.
pub const EMPTY_DIRECTORY_MARKER: &str = "empty directory";

/// A path discovered while walking the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Path relative to the root, segments joined with `/`
    pub relative_path: String,

    /// Filesystem path used for reading
    pub absolute_path: PathBuf,

    /// Whether the walker saw a directory here
    pub is_dir: bool,
}

impl PathEntry {
    /// Creates a new path entry.
    #[must_use]
    pub fn new(relative_path: impl Into<String>, absolute_path: PathBuf, is_dir: bool) -> Self {
        Self {
            relative_path: relative_path.into(),
            absolute_path,
            is_dir,
        }
    }

    /// Number of ancestors below the root, `0` for top-level entries.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.relative_path.matches('/').count()
    }
}

/// Converts `path` into a `/`-joined string relative to `root`.
///
/// Falls back to the full path when `path` is not under `root`.
#[must_use]
pub fn relative_path(path: &Path, root: &Path) -> String {
    let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Loaded contents keyed by relative path.
///
/// Regular files map to their text, empty directories to
/// [`EMPTY_DIRECTORY_MARKER`]. Directories with entries are absent.
/// Iteration is always in ascending path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRecord {
    entries: BTreeMap<String, String>,
}

impl ContentRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `content` for `path`, replacing any earlier value.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(path.into(), content.into());
    }

    /// Returns the content stored for `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Returns true if `path` has an entry.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries marking an empty directory.
    #[must_use]
    pub fn empty_directories(&self) -> usize {
        self.entries
            .values()
            .filter(|c| c.as_str() == EMPTY_DIRECTORY_MARKER)
            .count()
    }

    /// Iterates `(path, content)` pairs sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ContentRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_entry_depth() {
        let top = PathEntry::new("a.go", PathBuf::from("/root/a.go"), false);
        let nested = PathEntry::new("sub/deep/b.go", PathBuf::from("/root/sub/deep/b.go"), false);

        assert_eq!(top.depth(), 0);
        assert_eq!(nested.depth(), 2);
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/project");
        assert_eq!(relative_path(Path::new("/project/src/main.rs"), root), "src/main.rs");
        assert_eq!(relative_path(Path::new("/project/a.go"), root), "a.go");
    }

    #[test]
    fn test_content_record_iterates_sorted() {
        let mut record = ContentRecord::new();
        record.insert("sub/b.go", "package b");
        record.insert("a.go", "package a");
        record.insert("empty", EMPTY_DIRECTORY_MARKER);

        let keys: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a.go", "empty", "sub/b.go"]);
        assert_eq!(record.len(), 3);
        assert_eq!(record.empty_directories(), 1);
        assert_eq!(record.get("a.go"), Some("package a"));
        assert!(!record.contains("sub"));
    }

    #[test]
    fn test_content_record_from_iter() {
        let record: ContentRecord = vec![("x".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        assert!(!record.is_empty());
        assert!(record.contains("x"));
    }
}
