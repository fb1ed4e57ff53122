use crate::error::{Error, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Persists a finished bundle to disk.
pub(crate) struct Writer {
    output_path: PathBuf,
}

impl Writer {
    /// Creates a writer targeting `output_path`.
    pub(crate) fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// Writes `bundle` to the output path, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or any
    /// write step fails.
    pub(crate) fn write(&self, bundle: &str) -> Result<()> {
        if let Some(parent) = self
            .output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        write_file_atomic(&self.output_path, bundle)?;

        info!(
            "Wrote {} bytes to {}",
            bundle.len(),
            self.output_path.display()
        );
        Ok(())
    }
}

/// Writes a file atomically.
///
/// # Process
///
/// 1. Writes content to a temporary file next to the target
/// 2. Syncs the temporary file to disk
/// 3. Renames the temporary file over the target path
///
/// A failure at any step leaves the target untouched.
fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = temp_path_for(path);

    let result = write_temp(&temp_path, content)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

    if result.is_err() && temp_path.exists() {
        debug!("Removing partial file {}", temp_path.display());
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn write_temp(temp_path: &Path, content: &str) -> Result<()> {
    let mut temp_file = fs::File::create(temp_path).map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| Error::io(temp_path, e))?;

    // Ensure data is flushed to disk before the rename
    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_writer_writes_bundle() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.child("codefuse-project.txt");

        Writer::new(output.path()).write("bundle text").unwrap();

        output.assert("bundle text");
        assert!(!temp.child("codefuse-project.txt.tmp").exists());
    }

    #[test]
    fn test_writer_creates_parent_directories() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.child("out/nested/bundle.txt");

        Writer::new(output.path()).write("x").unwrap();

        output.assert("x");
    }

    #[test]
    fn test_writer_replaces_existing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.child("bundle.txt");
        output.write_str("old content").unwrap();

        Writer::new(output.path()).write("new content").unwrap();

        output.assert("new content");
    }

    #[test]
    fn test_writer_failure_leaves_no_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        // The target is an existing directory, so the final rename fails.
        let output = temp.child("taken");
        output.create_dir_all().unwrap();
        output.child("inside.txt").write_str("keep").unwrap();

        let result = Writer::new(output.path()).write("bundle");

        assert!(result.is_err());
        assert!(!temp.child("taken.tmp").exists());
        output.child("inside.txt").assert("keep");
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("/out/bundle.txt")),
            PathBuf::from("/out/bundle.txt.tmp")
        );
    }
}
