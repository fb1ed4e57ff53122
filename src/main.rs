use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use codefuse::{
    init_config_file, Config, ConfigFile, Pipeline, DEFAULT_MAX_CONCURRENCY, DEFAULT_OUTPUT_FILE,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "codefuse",
    version,
    author,
    about = "Bundle a project's source tree into a single text file",
    long_about = "Bundle a project's source tree into a single annotated text file.\n\n\
    The bundle starts with a tree of every included path, followed by the \
    contents of each file. Filters come from .codefuse-config.yaml and can be \
    overridden on the command line.\n\n\
    USAGE EXAMPLES:\n  \
      # Bundle the current directory\n  \
      codefuse generate\n\n  \
      # Only Go files, skipping vendored code\n  \
      codefuse generate --include-ext .go --ignore-pre vendor\n\n  \
      # Create a default config file\n  \
      codefuse init"
)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the project bundle
    Generate(GenerateArgs),

    /// Create a default .codefuse-config.yaml in the current directory
    Init,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Root directory to bundle
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    dir: PathBuf,

    /// File to write the bundle to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE, value_name = "FILE")]
    output: PathBuf,

    /// Prefixes of file and directory names to ignore
    #[arg(long = "ignore-pre", value_delimiter = ',', value_name = "PREFIX")]
    ignore_pre: Vec<String>,

    /// Extensions of files to ignore (with the leading dot)
    #[arg(long = "ignore-ext", value_delimiter = ',', value_name = "EXT")]
    ignore_ext: Vec<String>,

    /// Extensions of files to include exclusively (with the leading dot)
    #[arg(long = "include-ext", value_delimiter = ',', value_name = "EXT")]
    include_ext: Vec<String>,

    /// Maximum number of files read at the same time
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    max_concurrency: usize,

    /// Config file to use instead of ./.codefuse-config.yaml
    #[arg(short, long, env = "CODEFUSE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Dry run (don't write the bundle)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Init => init(),
    }
}

async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    let (file, used) = ConfigFile::discover(args.config.as_deref(), &cwd)
        .context("Failed to load config file")?;

    if let Some(path) = used {
        info!("Using config file {}", path.display());
    }

    let rule = file.filter_rule(args.ignore_pre, args.ignore_ext, args.include_ext);

    let config = Config::builder()
        .root_dir(args.dir)
        .output_path(args.output)
        .filter(rule)
        .max_concurrency(args.max_concurrency)
        .dry_run(args.dry_run)
        .build()
        .context("Failed to build configuration")?;

    let stats = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .await
        .context("Bundle generation failed")?;

    stats.print_summary();
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    let path = init_config_file(&cwd).context("Unable to write config file")?;
    println!("Config file created at: {}", path.display());
    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("codefuse=info"),
        1 => EnvFilter::new("codefuse=debug"),
        _ => EnvFilter::new("codefuse=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
