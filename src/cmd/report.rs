use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;
use tracing::warn;

use crate::cache::AnalysisCache;
use crate::config::{AppConfig, Backend, StoredConfig};
use crate::context::AppContext;
use crate::domain::window::parse_target_date;
use crate::error::AppResult;
use crate::infra::anthropic::AnthropicClient;
use crate::infra::claude_cli::ClaudeCliClient;
use crate::infra::git::GitCli;
use crate::infra::llm::GeminiClient;
use crate::services::{LanguageModelService, VersionControlService};
use crate::workflow::daily::{DailyReportOutcome, ScanTarget, create_daily_report};

#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Summarisation backend (defaults to the configured one).
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,
    /// API key for the selected backend.
    #[arg(long)]
    pub api_key: Option<String>,
    /// Always ask the backend, ignoring cached analyses.
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory to scan for repositories.
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,
    /// Report file (defaults to report/daily_report_<date>.md).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Day to report on, as YYYY-MM-DD (defaults to today).
    #[arg(long)]
    pub date: Option<String>,
    /// Only include commits by this author.
    #[arg(long)]
    pub author: Option<String>,
    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Registered project names or list indexes (all projects when omitted).
    pub projects: Vec<String>,
    /// Report file (defaults to report/daily_report_<date>.md).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Day to report on, as YYYY-MM-DD (defaults to today).
    #[arg(long)]
    pub date: Option<String>,
    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

pub async fn run_directory(args: RunArgs) -> AppResult<()> {
    let date = parse_target_date(args.date.as_deref(), Local::now().date_naive())?;
    let stored = StoredConfig::load()?;
    let ctx = build_context(&args.analysis, &stored).await;

    let targets = vec![ScanTarget {
        base: args.directory,
        author: args.author,
    }];
    let outcome = create_daily_report(&ctx, &targets, date, args.output).await?;
    print_outcome(date, outcome.as_ref());
    Ok(())
}

pub async fn run_projects(args: ReportArgs) -> AppResult<()> {
    let date = parse_target_date(args.date.as_deref(), Local::now().date_naive())?;
    let stored = StoredConfig::load()?;

    if stored.projects.is_empty() {
        println!("No projects registered. Add one with `daily-git-report add <path>`.");
        return Ok(());
    }

    let selected = if args.projects.is_empty() {
        stored.projects.iter().collect::<Vec<_>>()
    } else {
        args.projects
            .iter()
            .map(|name| stored.resolve_project(name))
            .collect::<AppResult<Vec<_>>>()?
    };

    let ctx = build_context(&args.analysis, &stored).await;
    let identity = ctx.version_control.identity().await;

    let targets = selected
        .into_iter()
        .map(|project| ScanTarget {
            base: project.path.clone(),
            author: stored.effective_author(project.author.as_deref(), &identity),
        })
        .collect::<Vec<_>>();

    let outcome = create_daily_report(&ctx, &targets, date, args.output).await?;
    print_outcome(date, outcome.as_ref());
    Ok(())
}

async fn build_context(args: &AnalysisArgs, stored: &StoredConfig) -> AppContext {
    let cache_file = if args.no_cache {
        None
    } else {
        AnalysisCache::default_path()
            .map_err(|err| warn!(%err, "analysis cache disabled"))
            .ok()
    };
    let config = AppConfig::resolve(args.backend, args.api_key.clone(), cache_file, stored);
    let language_model = select_language_model(&config).await;
    let version_control: Arc<dyn VersionControlService> = Arc::new(GitCli::new());
    AppContext::new(config, version_control, language_model)
}

/// Builds the configured backend, or `None` when it cannot be used.
async fn select_language_model(config: &AppConfig) -> Option<Arc<dyn LanguageModelService>> {
    match config.backend {
        Backend::Gemini => match &config.api_key {
            Some(key) => Some(Arc::new(GeminiClient::new(key.clone()))),
            None => {
                warn!("Gemini API key not configured (set GEMINI_API_KEY); using keyword analysis");
                None
            }
        },
        Backend::Anthropic => match &config.api_key {
            Some(key) => Some(Arc::new(AnthropicClient::new(key.clone()))),
            None => {
                warn!(
                    "Anthropic API key not configured (set ANTHROPIC_API_KEY); using keyword analysis"
                );
                None
            }
        },
        Backend::ClaudeCli => {
            let client = ClaudeCliClient::new();
            if client.probe().await {
                Some(Arc::new(client))
            } else {
                warn!("Claude CLI not found; using keyword analysis");
                None
            }
        }
        Backend::Keywords => None,
    }
}

fn print_outcome(date: NaiveDate, outcome: Option<&DailyReportOutcome>) {
    let Some(outcome) = outcome else {
        println!("No commits found for {date}.");
        return;
    };

    println!(
        "Report written to {} ({} commits across {} repositories).",
        outcome.output.display(),
        outcome.commits,
        outcome.repositories
    );
    println!("Summary: {}", outcome.analysis.summary);
    if let Some(reason) = outcome.analysis.fallback_reason() {
        println!("Keyword analysis used: {reason}");
    }
}
