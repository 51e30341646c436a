// Rust guideline compliant 2026-02-06

//! Pipewatch CLI Application
//!
//! Renders recorded pipeline event logs as indented console progress.

use clap::Parser;
use pipewatch_cli::{commands, init_tracing};
use pipewatch_core::ReporterOptions;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "pipewatch",
    version,
    about = "Pipewatch: console progress for data-pipeline jobs",
    long_about = "Pipewatch renders the lifecycle of a data-pipeline job (streams, destination batches, generated records and errors) as indented, timestamped console output ending with a PASS/FAIL verdict.",
    after_help = "Examples:\n  pipewatch replay job.jsonl\n  pipewatch replay --interval 1000 job.jsonl\n  cat job.jsonl | pipewatch replay --verbose -\n  pipewatch config\n"
)]
struct Cli {
    /// Custom config file path
    #[arg(long, global = true, default_value = "pipewatch.toml")]
    config: PathBuf,

    /// Minimum milliseconds between progress lines
    #[arg(long, global = true)]
    interval: Option<u64>,

    /// Show individual rows instead of counts
    #[arg(long, global = true)]
    verbose: bool,

    /// Job name used when the log does not supply one
    #[arg(long, global = true)]
    job_name: Option<String>,

    /// Diagnostic log level (error, warn, info, debug)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Render a JSONL event log
    Replay {
        /// Event log path ('-' for stdin)
        input: String,
    },

    /// Print the effective reporter options as TOML
    Config,
}

/// Resolves options from the config file, environment and flags.
fn resolve_options(cli: &Cli) -> anyhow::Result<ReporterOptions> {
    let mut options = ReporterOptions::load(Path::new(&cli.config))?;
    if let Some(interval) = cli.interval {
        options.interval_ms = interval;
    }
    if cli.verbose {
        options.verbose = true;
    }
    if let Some(name) = &cli.job_name {
        options.default_job_name = name.clone();
    }
    options.validate()?;
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = init_tracing(&cli.log_level, cli.log_file.as_deref())?;
    let options = resolve_options(&cli)?;
    tracing::debug!(?options, "resolved reporter options");

    match cli.command {
        Commands::Replay { input } => {
            commands::replay::execute(&input, options)?;
        }
        Commands::Config => {
            commands::config::execute(&options)?;
        }
    }

    Ok(())
}
