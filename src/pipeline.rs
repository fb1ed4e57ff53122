use crate::{
    bundle::serialize,
    config::Config,
    error::Result,
    file::{ContentRecord, PathEntry},
    loader::ContentLoader,
    tree::render_tree,
    walker::Walker,
    writer::Writer,
};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Statistics collected during pipeline execution.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Number of paths that passed the filter
    pub total_paths: usize,

    /// Directories among them
    pub directories: usize,

    /// Files among them
    pub files: usize,

    /// Entries dropped by the filter
    pub skipped: usize,

    /// Directories recorded as empty
    pub empty_directories: usize,

    /// Size of the bundle in bytes
    pub bundle_bytes: usize,

    /// Total execution time
    pub duration: Duration,

    /// Time spent walking the tree
    pub walk_duration: Duration,

    /// Time spent loading contents
    pub load_duration: Duration,

    /// Time spent rendering and serializing
    pub render_duration: Duration,

    /// Where the bundle went
    pub output_path: String,

    /// Whether the bundle was written to disk
    pub written: bool,
}

impl PipelineStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║            Bundle Summary                             ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Paths Included:       {:>8}                        ║",
            self.total_paths
        );
        println!(
            "║   - Files:            {:>8}                        ║",
            self.files
        );
        println!(
            "║   - Directories:      {:>8}                        ║",
            self.directories
        );
        println!(
            "║   - Empty dirs:       {:>8}                        ║",
            self.empty_directories
        );
        println!(
            "║ Paths Skipped:        {:>8}                        ║",
            self.skipped
        );
        println!(
            "║ Bundle Size:          {:>8} bytes                  ║",
            self.bundle_bytes
        );
        println!("║                                                       ║");
        println!("║ Output File:                                          ║");
        println!("║   {}", self.output_path);
        if !self.written {
            println!("║ ⚠ Not written (dry run mode)                          ║");
        }
        println!("║                                                       ║");
        println!("║ Timing Breakdown:                                     ║");
        println!(
            "║   - Walking:          {:>8.2}s                     ║",
            self.walk_duration.as_secs_f64()
        );
        println!(
            "║   - Loading:          {:>8.2}s                     ║",
            self.load_duration.as_secs_f64()
        );
        println!(
            "║   - Rendering:        {:>8.2}s                     ║",
            self.render_duration.as_secs_f64()
        );
        println!(
            "║   - Total:            {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Output of the in-memory part of the pipeline.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Included paths, in discovery order
    pub entries: Vec<PathEntry>,

    /// Loaded contents
    pub contents: ContentRecord,

    /// Rendered directory tree
    pub tree: String,

    /// Final bundle text
    pub text: String,
}

/// Orchestrates walking, loading, rendering and writing a bundle.
pub struct Pipeline {
    config: Config,
    walker: Walker,
    loader: ContentLoader,
    writer: Writer,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let walker = Walker::new(&config.root_dir, config.filter.clone());
        let loader = ContentLoader::new(config.max_concurrency);
        let writer = Writer::new(&config.output_path);

        Ok(Self {
            config,
            walker,
            loader,
            writer,
        })
    }

    /// Builds the bundle in memory without writing it.
    ///
    /// # Errors
    ///
    /// Returns the first IO error from walking, or the loader's error.
    pub async fn build(&self) -> Result<Bundle> {
        self.build_with_stats().await.map(|(bundle, _)| bundle)
    }

    /// Executes the complete pipeline and returns statistics.
    ///
    /// # Process
    ///
    /// 1. **Walk**: Discovers paths that pass the filter
    /// 2. **Load**: Reads file contents concurrently
    /// 3. **Render**: Draws the tree and serializes the bundle
    /// 4. **Write**: Persists the bundle atomically (skipped on dry run)
    ///
    /// # Errors
    ///
    /// Returns an error if any stage fails; nothing is written in that case.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use codefuse::{Config, Pipeline};
    ///
    /// # async fn demo() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .root_dir("./src")
    ///     .build()?;
    ///
    /// let stats = Pipeline::new(config)?.run().await?;
    /// stats.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(root_dir = %self.config.root_dir.display()))]
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();

        info!("Starting bundle generation");

        let (bundle, mut stats) = self.build_with_stats().await?;

        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file write");
        } else {
            info!("Stage 4/4: Writing bundle...");
            self.writer.write(&bundle.text)?;
            stats.written = true;
        }

        stats.duration = start_time.elapsed();

        info!(
            "✓ Bundle completed successfully in {:.2}s",
            stats.duration.as_secs_f64()
        );

        Ok(stats)
    }

    async fn build_with_stats(&self) -> Result<(Bundle, PipelineStats)> {
        let start_time = Instant::now();

        // Stage 1: Walking
        info!("Stage 1/4: Walking project tree...");
        let walk_start = Instant::now();
        let (entries, walk_stats) = self.walker.walk_with_stats()?;
        let walk_duration = walk_start.elapsed();

        info!(
            "✓ Found {} paths ({} files, {} directories) in {:.2}s",
            entries.len(),
            walk_stats.files,
            walk_stats.directories,
            walk_duration.as_secs_f64()
        );

        // Stage 2: Loading
        info!("Stage 2/4: Loading contents...");
        let load_start = Instant::now();
        let contents = self.loader.load(&entries).await?;
        let load_duration = load_start.elapsed();

        info!(
            "✓ Loaded {} entries in {:.2}s",
            contents.len(),
            load_duration.as_secs_f64()
        );

        // Stage 3: Rendering
        info!("Stage 3/4: Rendering bundle...");
        let render_start = Instant::now();
        let paths: Vec<&str> = entries.iter().map(|e| e.relative_path.as_str()).collect();
        let tree = render_tree(&paths);
        let text = serialize(&tree, &contents);
        let render_duration = render_start.elapsed();

        let stats = PipelineStats {
            total_paths: entries.len(),
            directories: walk_stats.directories,
            files: walk_stats.files,
            skipped: walk_stats.skipped,
            empty_directories: contents.empty_directories(),
            bundle_bytes: text.len(),
            duration: start_time.elapsed(),
            walk_duration,
            load_duration,
            render_duration,
            output_path: self.config.output_path.display().to_string(),
            written: false,
        };

        Ok((
            Bundle {
                entries,
                contents,
                tree,
                text,
            },
            stats,
        ))
    }
}
