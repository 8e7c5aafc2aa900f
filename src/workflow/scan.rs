use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::commit::{CommitRecord, RepositoryCommitSet};
use crate::domain::window::DayWindow;
use crate::error::FetchOutcome;
use crate::infra::discovery::discover_repositories;
use crate::services::VersionControlService;

/// Commits of one repository that fall inside `window`.
///
/// A failed history query fails the whole call. Failed per-commit queries
/// only blank the field they were meant to fill.
pub async fn extract_commits(
    vcs: &dyn VersionControlService,
    repo: &Path,
    window: &DayWindow,
    author: Option<&str>,
) -> FetchOutcome<Vec<CommitRecord>> {
    let headers = vcs.commit_log(repo, window, author).await?;
    let mut commits = Vec::with_capacity(headers.len());

    for header in headers {
        if !window.contains(&header.timestamp) {
            debug!(commit = %header.id, timestamp = %header.timestamp, "outside the day window");
            continue;
        }

        let (files, stats, diff) = tokio::join!(
            vcs.changed_files(repo, &header.id),
            vcs.line_stats(repo, &header.id),
            vcs.diff_text(repo, &header.id),
        );
        let files = settle(files, repo, &header.id);
        let stats = settle(stats, repo, &header.id);
        let diff = settle(diff, repo, &header.id);

        commits.push(CommitRecord::new(header, files, stats, &diff));
    }

    Ok(commits)
}

fn settle<T: Default>(outcome: FetchOutcome<T>, repo: &Path, commit_id: &str) -> T {
    outcome.unwrap_or_else(|failure| {
        warn!(repo = %repo.display(), commit = commit_id, %failure, "using empty value");
        T::default()
    })
}

/// Scans every repository under `base`, in discovery order, and keeps the
/// ones with at least one commit on the day.
pub async fn scan_repositories(
    vcs: &dyn VersionControlService,
    base: &Path,
    window: &DayWindow,
    author: Option<&str>,
) -> Vec<RepositoryCommitSet> {
    let base = match base.canonicalize() {
        Ok(base) => base,
        Err(err) => {
            warn!(base = %base.display(), %err, "cannot scan directory");
            return Vec::new();
        }
    };

    let repositories = discover_repositories(&base);
    info!(
        base = %base.display(),
        date = %window.date(),
        repositories = repositories.len(),
        "scanning"
    );

    let mut sets = Vec::new();
    for repo in repositories {
        let display_name = repo
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| repo.display().to_string());

        let commits = match extract_commits(vcs, &repo, window, author).await {
            Ok(commits) => commits,
            Err(failure) => {
                warn!(repository = %display_name, %failure, "skipping repository");
                continue;
            }
        };
        if commits.is_empty() {
            info!(repository = %display_name, "no commits");
            continue;
        }
        info!(repository = %display_name, commits = commits.len(), "commits found");

        let remote_url = match vcs.remote_url(&repo).await {
            Ok(url) if !url.is_empty() => Some(url),
            Ok(_) => None,
            Err(failure) => {
                debug!(repository = %display_name, %failure, "no remote url");
                None
            }
        };

        sets.push(RepositoryCommitSet {
            path: repo,
            display_name,
            remote_url,
            commits,
        });
    }

    sets
}
