//! # codefuse
//!
//! Bundles a project's source tree into one annotated text file: a rendered
//! directory tree followed by the contents of every included file.
//!
//! ## Features
//!
//! - Name-prefix pruning and extension allow/deny lists
//! - Concurrent content loading with a configurable limit
//! - Byte-for-byte reproducible output regardless of traversal order
//! - Atomic output writes
//!
//! ## Quick Start
//!
//! ```no_run
//! use codefuse::{Config, FilterRule, Pipeline};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .root_dir(".")
//!     .output_path("codefuse-project.txt")
//!     .filter(FilterRule::new().ignore_prefixes(vec!["target".into(), ".git".into()]))
//!     .build()?;
//!
//! Pipeline::new(config)?.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Filter**: Decides per path whether it is bundled
//! 2. **Walker**: Discovers included paths, pruning skipped directories
//! 3. **Loader**: Reads contents concurrently
//! 4. **Tree**: Renders the sorted paths as a tree
//! 5. **Bundle**: Serializes tree and contents into the final text

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod bundle;
mod config;
mod error;
mod file;
mod filter;
mod loader;
mod pipeline;
mod tree;
mod walker;
mod writer;

pub use bundle::{serialize, BUNDLE_HEADER};
pub use config::{
    init_config_file, Config, ConfigBuilder, ConfigFile, CONFIG_FILE_NAME,
    DEFAULT_CONFIG_TEMPLATE, DEFAULT_OUTPUT_FILE,
};
pub use error::{Error, Result};
pub use file::{ContentRecord, PathEntry, EMPTY_DIRECTORY_MARKER};
pub use filter::{extension, should_skip, FilterRule};
pub use loader::{load_contents, ContentLoader, DEFAULT_MAX_CONCURRENCY};
pub use pipeline::{Bundle, Pipeline, PipelineStats};
pub use tree::render_tree;
pub use walker::{walk, Walker};

/// Runs the complete pipeline with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - Any path under the root cannot be read
/// - The bundle cannot be written
pub async fn run(config: Config) -> Result<PipelineStats> {
    Pipeline::new(config)?.run().await
}

/// Builds the bundle text for `root` without touching the output file.
///
/// # Errors
///
/// Returns [`Error::Io`] if walking or loading fails.
///
/// # Examples
///
/// ```no_run
/// use codefuse::{bundle_directory, FilterRule};
///
/// # async fn demo() -> codefuse::Result<()> {
/// let rule = FilterRule::new().include_extensions(vec![".rs".into()]);
/// let text = bundle_directory("./src", &rule, 32).await?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
pub async fn bundle_directory(
    root: impl AsRef<std::path::Path>,
    rule: &FilterRule,
    max_concurrency: usize,
) -> Result<String> {
    let entries = walk(root, rule)?;
    let contents = load_contents(&entries, max_concurrency).await?;
    let paths: Vec<&str> = entries.iter().map(|e| e.relative_path.as_str()).collect();
    Ok(serialize(&render_tree(&paths), &contents))
}
