mod cache;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod report;
mod services;
mod workflow;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::project::{self, AddArgs, RemoveArgs, UpdateArgs};
use crate::cmd::report::{self as report_cmd, ReportArgs, RunArgs};
use crate::error::AppResult;

#[derive(Parser)]
#[command(
    name = "daily-git-report",
    author,
    version,
    about = "Summarise a day's git commits into a Markdown report"
)]
struct Cli {
    /// Show debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory and write the report for one day.
    Run(RunArgs),
    /// Write the report for registered projects.
    Report(ReportArgs),
    /// Register a project directory.
    Add(AddArgs),
    /// List registered projects.
    List,
    /// Unregister a project.
    Remove(RemoveArgs),
    /// Change a registered project.
    Update(UpdateArgs),
    /// Show or change stored settings.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(cli.verbose, rust_log.as_deref()))
        .try_init();

    match cli.command {
        Commands::Run(args) => report_cmd::run_directory(args).await,
        Commands::Report(args) => report_cmd::run_projects(args).await,
        Commands::Add(args) => project::add(args),
        Commands::List => project::list(),
        Commands::Remove(args) => project::remove(args),
        Commands::Update(args) => project::update(args),
        Commands::Config(args) => config_cmd::run(args).await,
    }
}

/// INFO unless `RUST_LOG` says otherwise; `-v` always raises it to DEBUG.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let filter = match rust_log.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new("info"),
    };
    if verbose {
        filter.add_directive(Level::DEBUG.into())
    } else {
        filter
    }
}
