use std::path::Path;

/// Name-prefix and extension rules deciding which paths end up in a bundle.
///
/// Prefixes are matched against the base name of a path, extensions are
/// compared exactly and include the leading dot (`".go"`, not `"go"`).
/// An empty include list allows every extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRule {
    prefixes_to_ignore: Vec<String>,
    extensions_to_ignore: Vec<String>,
    extensions_to_include: Vec<String>,
}

impl FilterRule {
    /// Creates an empty rule that lets everything through.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any file or directory whose base name starts with one of `prefixes`.
    #[must_use]
    pub fn ignore_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.prefixes_to_ignore = non_blank(prefixes);
        self
    }

    /// Rejects files with one of the given extensions.
    #[must_use]
    pub fn ignore_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions_to_ignore = non_blank(extensions);
        self
    }

    /// Restricts files to the given extensions.
    #[must_use]
    pub fn include_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions_to_include = non_blank(extensions);
        self
    }

    /// Prefixes rejected by this rule.
    #[must_use]
    pub fn prefixes_to_ignore(&self) -> &[String] {
        &self.prefixes_to_ignore
    }

    /// Extensions rejected by this rule.
    #[must_use]
    pub fn extensions_to_ignore(&self) -> &[String] {
        &self.extensions_to_ignore
    }

    /// Extensions exclusively allowed by this rule.
    #[must_use]
    pub fn extensions_to_include(&self) -> &[String] {
        &self.extensions_to_include
    }

    /// Returns true when `path` must be left out of the bundle.
    ///
    /// For a directory a `true` result means its whole subtree is pruned.
    #[must_use]
    pub fn should_skip(&self, path: &Path, is_dir: bool) -> bool {
        should_skip(
            path,
            is_dir,
            &self.prefixes_to_ignore,
            &self.extensions_to_ignore,
            &self.extensions_to_include,
        )
    }
}

/// Decides whether `path` is skipped.
///
/// Rules are checked in order:
/// 1. base name starts with an ignored prefix (files and directories)
/// 2. extension is in `extensions_to_ignore` (files only)
/// 3. directories and rules without an include list pass
/// 4. files pass only if their extension is in `extensions_to_include`
#[must_use]
pub fn should_skip(
    path: &Path,
    is_dir: bool,
    prefixes_to_ignore: &[String],
    extensions_to_ignore: &[String],
    extensions_to_include: &[String],
) -> bool {
    let name = base_name(path);

    if prefixes_to_ignore
        .iter()
        .any(|prefix| name.starts_with(prefix.as_str()))
    {
        return true;
    }

    if is_dir {
        return false;
    }

    let ext = extension(&name);

    if extensions_to_ignore.iter().any(|e| e == ext) {
        return true;
    }

    if extensions_to_include.is_empty() {
        return false;
    }

    !extensions_to_include.iter().any(|e| e == ext)
}

/// Returns the extension of a base name, from the last `.` inclusive.
///
/// Names without a dot have an empty extension; dotfiles such as
/// `.gitignore` are all extension.
#[must_use]
pub fn extension(name: &str) -> &str {
    name.rfind('.').map_or("", |idx| &name[idx..])
}

// Blank entries would match every name as a prefix, so they are dropped.
fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
        .into_owned()
}
