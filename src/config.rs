use crate::error::{Error, Result};
use crate::filter::FilterRule;
use crate::loader::DEFAULT_MAX_CONCURRENCY;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the generated bundle.
pub const DEFAULT_OUTPUT_FILE: &str = "codefuse-project.txt";

/// File name of the per-project config file.
pub const CONFIG_FILE_NAME: &str = ".codefuse-config.yaml";

/// Template written by `codefuse init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = "\
# Configuration for the tool

# specify the prefixes of files and directories to ignore (by default common configuration files are ignored)
ignore-pre: # ex. [tests, readme.md, scripts]
# specify the extensions of files to ignore
ignore-ext: # ex. [.go, .py, .js]
# specify the extensions of files to include
include-ext: # ex. [.go, .py, .js]
";

/// Configuration for a bundling run.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Root directory to bundle
    pub root_dir: PathBuf,

    /// File the bundle is written to
    pub output_path: PathBuf,

    /// Which paths are included
    pub filter: FilterRule,

    /// Maximum number of paths loaded at once
    pub max_concurrency: usize,

    /// Dry run mode (no file writes)
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use codefuse::Config;
    ///
    /// let config = Config::builder()
    ///     .root_dir(".")
    ///     .max_concurrency(16)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Root directory doesn't exist or is not a directory
    /// - `max_concurrency` is zero
    pub fn validate(&self) -> Result<()> {
        if !self.root_dir.exists() {
            return Err(Error::config(format!(
                "Root directory does not exist: {}",
                self.root_dir.display()
            )));
        }

        if !self.root_dir.is_dir() {
            return Err(Error::config(format!(
                "Root path is not a directory: {}",
                self.root_dir.display()
            )));
        }

        if self.max_concurrency == 0 {
            return Err(Error::config("max_concurrency must be greater than 0"));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(Error::config("output path must not be empty"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            filter: FilterRule::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            dry_run: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    filter: Option<FilterRule>,
    max_concurrency: Option<usize>,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the root directory to bundle.
    #[must_use]
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(path.into());
        self
    }

    /// Sets the file the bundle is written to.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Sets the path filter.
    #[must_use]
    pub fn filter(mut self, rule: FilterRule) -> Self {
        self.filter = Some(rule);
        self
    }

    /// Sets how many paths are loaded concurrently.
    #[must_use]
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            root_dir: self.root_dir.unwrap_or_else(|| PathBuf::from(".")),
            output_path: self
                .output_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            filter: self.filter.unwrap_or_default(),
            max_concurrency: self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Filter lists persisted in `.codefuse-config.yaml`.
///
/// Every key is optional and may be left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConfigFile {
    /// Name prefixes to ignore
    pub ignore_pre: Option<Vec<String>>,

    /// Extensions to ignore
    pub ignore_ext: Option<Vec<String>>,

    /// Extensions to include exclusively
    pub include_ext: Option<Vec<String>>,
}

impl ConfigFile {
    /// Parses config file text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed YAML.
    pub fn parse(text: &str) -> Result<Self> {
        // A file holding only comments is an empty YAML document.
        if text.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads and parses the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        debug!("Loaded config file {}", path.display());
        Self::parse(&text)
    }

    /// Loads the config file to use for a run.
    ///
    /// An explicit path must exist. Without one, [`CONFIG_FILE_NAME`] in
    /// `search_dir` is used when present, otherwise an empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn discover(explicit: Option<&Path>, search_dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidate = search_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Ok((Self::load(&candidate)?, Some(candidate)));
        }

        debug!("No config file found in {}", search_dir.display());
        Ok((Self::default(), None))
    }

    /// Builds a filter rule, letting non-empty overrides replace file values.
    #[must_use]
    pub fn filter_rule(
        &self,
        ignore_pre: Vec<String>,
        ignore_ext: Vec<String>,
        include_ext: Vec<String>,
    ) -> FilterRule {
        fn pick(cli: Vec<String>, file: Option<&Vec<String>>) -> Vec<String> {
            if cli.is_empty() {
                file.cloned().unwrap_or_default()
            } else {
                cli
            }
        }

        FilterRule::new()
            .ignore_prefixes(pick(ignore_pre, self.ignore_pre.as_ref()))
            .ignore_extensions(pick(ignore_ext, self.ignore_ext.as_ref()))
            .include_extensions(pick(include_ext, self.include_ext.as_ref()))
    }
}

/// Writes [`DEFAULT_CONFIG_TEMPLATE`] to [`CONFIG_FILE_NAME`] inside `dir`.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file already exists, or an IO error if
/// it cannot be written.
pub fn init_config_file(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);

    if path.exists() {
        return Err(Error::config(format!(
            "Config file already exists at {}",
            path.display()
        )));
    }

    fs::write(&path, DEFAULT_CONFIG_TEMPLATE).map_err(|e| Error::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_default_config() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder().root_dir(temp.path()).build().unwrap();

        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_FILE));
        assert_eq!(config.filter, FilterRule::default());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_invalid_root_dir() {
        let result = Config::builder()
            .root_dir("/nonexistent/path/that/should/not/exist")
            .build();

        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("file.txt").write_str("x").unwrap();

        let result = Config::builder()
            .root_dir(temp.child("file.txt").path())
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();

        let result = Config::builder()
            .root_dir(temp.path())
            .max_concurrency(0)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_template_is_empty_config() {
        let parsed = ConfigFile::parse(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(parsed, ConfigFile::default());
    }

    #[test]
    fn test_parse_comment_only_file() {
        let parsed = ConfigFile::parse("# nothing here\n\n").unwrap();
        assert_eq!(parsed, ConfigFile::default());
    }

    #[test]
    fn test_parse_lists() {
        let parsed = ConfigFile::parse(
            "ignore-pre: [tests, node_modules]\nignore-ext:\n  - .lock\ninclude-ext: [.go]\n",
        )
        .unwrap();

        assert_eq!(
            parsed.ignore_pre,
            Some(vec!["tests".to_string(), "node_modules".to_string()])
        );
        assert_eq!(parsed.ignore_ext, Some(vec![".lock".to_string()]));
        assert_eq!(parsed.include_ext, Some(vec![".go".to_string()]));
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let err = ConfigFile::parse("ignore-pre: [unclosed").unwrap_err();
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_cli_lists_override_file() {
        let file = ConfigFile {
            ignore_pre: Some(vec!["vendor".to_string()]),
            ignore_ext: Some(vec![".md".to_string()]),
            include_ext: None,
        };

        let rule = file.filter_rule(vec!["dist".to_string()], vec![], vec![".go".to_string()]);

        assert_eq!(rule.prefixes_to_ignore(), ["dist".to_string()]);
        assert_eq!(rule.extensions_to_ignore(), [".md".to_string()]);
        assert_eq!(rule.extensions_to_include(), [".go".to_string()]);
    }

    #[test]
    fn test_discover_uses_file_in_search_dir() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child(CONFIG_FILE_NAME)
            .write_str("ignore-pre: [build]\n")
            .unwrap();

        let (file, path) = ConfigFile::discover(None, temp.path()).unwrap();

        assert_eq!(file.ignore_pre, Some(vec!["build".to_string()]));
        assert_eq!(path, Some(temp.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_discover_without_file() {
        let temp = assert_fs::TempDir::new().unwrap();

        let (file, path) = ConfigFile::discover(None, temp.path()).unwrap();

        assert_eq!(file, ConfigFile::default());
        assert!(path.is_none());
    }

    #[test]
    fn test_discover_explicit_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.path().join("custom.yaml");

        let err = ConfigFile::discover(Some(&missing), temp.path()).unwrap_err();

        assert!(err.is_io());
    }

    #[test]
    fn test_init_writes_template_once() {
        let temp = assert_fs::TempDir::new().unwrap();

        let path = init_config_file(temp.path()).unwrap();
        assert_eq!(path, temp.path().join(CONFIG_FILE_NAME));
        temp.child(CONFIG_FILE_NAME).assert(DEFAULT_CONFIG_TEMPLATE);

        let err = init_config_file(temp.path()).unwrap_err();
        assert!(err.is_config());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            DEFAULT_CONFIG_TEMPLATE
        );
    }
}
