use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::analysis::AggregateAnalysis;
use crate::domain::window::DayWindow;
use crate::error::AppResult;
use crate::report::MarkdownReport;
use crate::workflow::analyze::analyze_commits;
use crate::workflow::scan::scan_repositories;

/// One base directory to scan, with its author filter.
#[derive(Debug, Clone)]
pub struct ScanTarget {
    pub base: PathBuf,
    pub author: Option<String>,
}

pub struct DailyReportOutcome {
    pub output: PathBuf,
    pub analysis: AggregateAnalysis,
    pub repositories: usize,
    pub commits: usize,
}

pub fn default_output_path(date: NaiveDate) -> PathBuf {
    PathBuf::from("report").join(format!("daily_report_{}.md", date.format("%Y-%m-%d")))
}

/// Scans every target, analyses the commits and writes the report.
///
/// Returns `None` when no commits were found; nothing is written then.
pub async fn create_daily_report(
    ctx: &AppContext,
    targets: &[ScanTarget],
    date: NaiveDate,
    output: Option<PathBuf>,
) -> AppResult<Option<DailyReportOutcome>> {
    let window = DayWindow::new(date);
    let mut sets = Vec::new();

    for target in targets {
        if !target.base.exists() {
            warn!(path = %target.base.display(), "path does not exist, skipping");
            continue;
        }
        if let Some(author) = &target.author {
            info!(author = %author, "filtering by author");
        }
        let found = scan_repositories(
            ctx.version_control.as_ref(),
            &target.base,
            &window,
            target.author.as_deref(),
        )
        .await;
        sets.extend(found);
    }

    if sets.is_empty() {
        return Ok(None);
    }

    info!(backend = ctx.backend_name(), "analysing commits");
    let analysis = analyze_commits(ctx, &sets).await;

    let markdown = MarkdownReport {
        date,
        backend_name: ctx.backend_name(),
        generated_at: Local::now(),
    }
    .render(&sets, &analysis);

    let output = output.unwrap_or_else(|| default_output_path(date));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, markdown)?;

    Ok(Some(DailyReportOutcome {
        output,
        repositories: sets.len(),
        commits: sets.iter().map(|s| s.commits.len()).sum(),
        analysis,
    }))
}
