//! # blockpar
//!
//! Command-line interface for the block parallelism analyzer.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze one block trace
//! blockpar analyze 16026516.json --lanes 2,4,8
//!
//! # Analyze every trace in a directory, writing <name>-result.json files
//! blockpar folder ./blocks --jobs 8 --metrics
//!
//! # Show the effective configuration
//! blockpar config --show
//! ```

use anyhow::Context;
use blockpar_scheduler::BlockAnalyzer;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use commands::AnalysisArgs;
pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// Block parallelism analyzer
#[derive(Parser, Debug)]
#[command(name = "blockpar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to ~/.blockpar/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a single block trace file
    Analyze {
        /// Block trace (JSON)
        file: PathBuf,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Analyze every block trace in a directory
    Folder {
        /// Directory of block traces
        dir: PathBuf,
        /// Files analyzed concurrently
        #[arg(long)]
        jobs: Option<usize>,
        /// Print collected metrics when done
        #[arg(long)]
        metrics: bool,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Show or initialize configuration
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing on stderr so stdout stays machine readable
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(e) = run(cli).await {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "error": format!("{e:#}"),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // `config --init` creates the file, so it may not exist yet
    let config = match cli.command {
        Commands::Config { init: true, .. } => Config::load_or_default(cli.config.as_deref()),
        _ => Config::load(cli.config.as_deref()),
    }
    .context("loading configuration")?;

    match cli.command {
        Commands::Analyze { file, analysis } => {
            let analyzer = analyzer(&analysis, &config)?;
            commands::analyze::execute(&analyzer, &file, cli.json)?;
        }
        Commands::Folder {
            dir,
            jobs,
            metrics,
            analysis,
        } => {
            let analyzer = analyzer(&analysis, &config)?;
            let jobs = jobs.unwrap_or(config.jobs);
            if jobs == 0 {
                return Err(CliError::InvalidInput("--jobs must be positive".to_string()).into());
            }
            commands::folder::execute(analyzer, &dir, jobs, metrics, cli.json)
                .await
                .with_context(|| format!("analyzing {}", dir.display()))?;
        }
        Commands::Config { show, init } => {
            handle_config(&config, cli.config.as_deref(), show, init, cli.json)?;
        }
    }
    Ok(())
}

fn analyzer(args: &AnalysisArgs, config: &Config) -> Result<BlockAnalyzer, CliError> {
    let analysis = args.resolve(config);
    analysis.validate()?;
    Ok(BlockAnalyzer::new(analysis))
}

fn handle_config(
    config: &Config,
    path: Option<&Path>,
    show: bool,
    init: bool,
    json: bool,
) -> Result<(), CliError> {
    if init {
        let written = config.save(path)?;
        Output::new(json)
            .field("status", "saved")
            .field("path", &written.display().to_string())
            .line(format!("Configuration saved to {}", written.display()))
            .print();
    } else if show {
        let toml = toml::to_string_pretty(config).map_err(|e| CliError::Config(e.to_string()))?;
        Output::new(json)
            .fields_of(config)
            .line(toml.trim_end())
            .print();
    } else {
        Output::new(json)
            .line("Use --show to display config, or --init to write it")
            .print();
    }
    Ok(())
}
