//! In-memory stand-ins for the service traits.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::DateTime;

use crate::domain::analysis::AggregateAnalysis;
use crate::domain::commit::{CommitHeader, LineStats, RepositoryCommitSet};
use crate::domain::window::DayWindow;
use crate::error::{AppError, AppResult, FetchFailure, FetchOutcome};
use crate::infra::llm::parse_analysis;
use crate::services::{Identity, LanguageModelService, VersionControlService};

#[derive(Clone)]
pub struct FakeCommit {
    header: CommitHeader,
    files: Vec<String>,
    stats: LineStats,
    diff: String,
}

impl FakeCommit {
    pub fn new(id: &str, author: &str, timestamp: &str, message: &str) -> Self {
        Self {
            header: CommitHeader {
                id: id.to_string(),
                author: author.to_string(),
                timestamp: DateTime::parse_from_rfc3339(timestamp).expect("rfc3339 timestamp"),
                message: message.to_string(),
            },
            files: Vec::new(),
            stats: LineStats::default(),
            diff: String::new(),
        }
    }

    pub fn files(mut self, files: &[&str]) -> Self {
        self.files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn stats(mut self, insertions: u64, deletions: u64) -> Self {
        self.stats = LineStats {
            insertions,
            deletions,
        };
        self
    }

    pub fn diff(mut self, diff: &str) -> Self {
        self.diff = diff.to_string();
        self
    }
}

#[derive(Default)]
pub struct FakeVcs {
    repos: HashMap<PathBuf, Vec<FakeCommit>>,
    failing_log: HashSet<PathBuf>,
    failing_files: HashSet<String>,
    timed_out_stats: HashSet<String>,
    failing_diff: HashSet<String>,
}

impl FakeVcs {
    pub fn with_commits(mut self, repo: PathBuf, commits: Vec<FakeCommit>) -> Self {
        self.repos.insert(repo, commits);
        self
    }

    pub fn failing_log(mut self, repo: PathBuf) -> Self {
        self.failing_log.insert(repo);
        self
    }

    pub fn failing_files(mut self, commit_id: &str) -> Self {
        self.failing_files.insert(commit_id.to_string());
        self
    }

    pub fn timed_out_stats(mut self, commit_id: &str) -> Self {
        self.timed_out_stats.insert(commit_id.to_string());
        self
    }

    pub fn failing_diff(mut self, commit_id: &str) -> Self {
        self.failing_diff.insert(commit_id.to_string());
        self
    }

    fn commit(&self, repo: &Path, commit_id: &str) -> Option<&FakeCommit> {
        self.repos
            .get(repo)?
            .iter()
            .find(|c| c.header.id == commit_id)
    }
}

fn exit(operation: &'static str) -> FetchFailure {
    FetchFailure::Exit {
        operation,
        code: Some(128),
        stderr: "fatal: scripted failure".to_string(),
    }
}

#[async_trait]
impl VersionControlService for FakeVcs {
    async fn commit_log(
        &self,
        repo: &Path,
        _window: &DayWindow,
        author: Option<&str>,
    ) -> FetchOutcome<Vec<CommitHeader>> {
        if self.failing_log.contains(repo) {
            return Err(FetchFailure::TimedOut {
                operation: "log query",
                seconds: 30,
            });
        }
        Ok(self
            .repos
            .get(repo)
            .map(|commits| {
                commits
                    .iter()
                    .filter(|c| author.is_none_or(|a| c.header.author == a))
                    .map(|c| c.header.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn changed_files(&self, repo: &Path, commit_id: &str) -> FetchOutcome<Vec<String>> {
        if self.failing_files.contains(commit_id) {
            return Err(exit("file list query"));
        }
        self.commit(repo, commit_id)
            .map(|c| c.files.clone())
            .ok_or_else(|| exit("file list query"))
    }

    async fn line_stats(&self, repo: &Path, commit_id: &str) -> FetchOutcome<LineStats> {
        if self.timed_out_stats.contains(commit_id) {
            return Err(FetchFailure::TimedOut {
                operation: "stat query",
                seconds: 10,
            });
        }
        self.commit(repo, commit_id)
            .map(|c| c.stats)
            .ok_or_else(|| exit("stat query"))
    }

    async fn diff_text(&self, repo: &Path, commit_id: &str) -> FetchOutcome<String> {
        if self.failing_diff.contains(commit_id) {
            return Err(exit("diff query"));
        }
        self.commit(repo, commit_id)
            .map(|c| c.diff.clone())
            .ok_or_else(|| exit("diff query"))
    }

    async fn remote_url(&self, repo: &Path) -> FetchOutcome<String> {
        let name = repo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("git@example.com:team/{name}.git"))
    }

    async fn identity(&self) -> Identity {
        Identity::default()
    }
}

/// Answers with a canned reply, or fails when the reply is `None`.
pub struct FakeModel {
    reply: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeModel {
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModelService for FakeModel {
    fn backend_name(&self) -> &str {
        "Fake Model"
    }

    async fn analyze(&self, _sets: &[RepositoryCommitSet]) -> AppResult<AggregateAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => parse_analysis(reply, self.backend_name()),
            None => Err(AppError::LanguageModel("quota exceeded".to_string())),
        }
    }
}
