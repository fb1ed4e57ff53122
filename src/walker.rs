use crate::{
    error::{Error, Result},
    file::{relative_path, PathEntry},
    filter::FilterRule,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Statistics collected during a walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WalkStats {
    /// Directories kept
    pub directories: usize,

    /// Files kept
    pub files: usize,

    /// Entries rejected by the filter (pruned directories count once)
    pub skipped: usize,
}

/// Discovers the paths under a root directory that pass a [`FilterRule`].
#[derive(Debug, Clone)]
pub struct Walker {
    root_dir: PathBuf,
    rule: FilterRule,
}

impl Walker {
    /// Creates a walker for `root_dir`.
    #[must_use]
    pub fn new(root_dir: impl Into<PathBuf>, rule: FilterRule) -> Self {
        Self {
            root_dir: root_dir.into(),
            rule,
        }
    }

    /// Walks the tree depth-first and returns every included path.
    ///
    /// The root itself is never part of the result. Directories rejected by
    /// the rule are not descended into. Symbolic links are reported as
    /// entries but never followed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] for the first entry that cannot be read; the
    /// paths gathered so far are dropped.
    pub fn walk(&self) -> Result<Vec<PathEntry>> {
        self.walk_with_stats().map(|(entries, _)| entries)
    }

    pub(crate) fn walk_with_stats(&self) -> Result<(Vec<PathEntry>, WalkStats)> {
        debug!("Walking {}", self.root_dir.display());

        let mut stats = WalkStats::default();
        let mut skipped = 0;
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root_dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let skip = self.rule.should_skip(entry.path(), entry.file_type().is_dir());
                if skip {
                    trace!("Skipping {}", entry.path().display());
                    skipped += 1;
                }
                !skip
            });

        for result in walker {
            let entry = result.map_err(|e| walk_error(&self.root_dir, e))?;
            let is_dir = entry.file_type().is_dir();

            if is_dir {
                stats.directories += 1;
            } else {
                stats.files += 1;
            }

            entries.push(PathEntry::new(
                relative_path(entry.path(), &self.root_dir),
                entry.path().to_path_buf(),
                is_dir,
            ));
        }

        stats.skipped = skipped;

        debug!(
            "Walk complete: {} directories, {} files, {} skipped",
            stats.directories, stats.files, stats.skipped
        );

        Ok((entries, stats))
    }
}

/// Walks `root` with `rule`; see [`Walker::walk`].
///
/// # Errors
///
/// Returns [`Error::Io`] if any entry under `root` cannot be read.
pub fn walk(root: impl AsRef<Path>, rule: &FilterRule) -> Result<Vec<PathEntry>> {
    Walker::new(root.as_ref(), rule.clone()).walk()
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    Error::io(path, source)
}
