use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::commit::{CommitHeader, LineStats};
use crate::domain::stat::parse_stat_summary;
use crate::domain::window::DayWindow;
use crate::error::{FetchFailure, FetchOutcome};
use crate::services::{Identity, VersionControlService};

const FIELD_SEPARATOR: char = '\u{1f}';
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%ai%x1f%s";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Clone, Copy)]
pub struct GitTimeouts {
    pub identity: Duration,
    pub log: Duration,
    pub file_list: Duration,
    pub stat: Duration,
    pub remote: Duration,
    pub diff: Duration,
}

impl Default for GitTimeouts {
    fn default() -> Self {
        Self {
            identity: Duration::from_secs(5),
            log: Duration::from_secs(30),
            file_list: Duration::from_secs(10),
            stat: Duration::from_secs(10),
            remote: Duration::from_secs(10),
            diff: Duration::from_secs(15),
        }
    }
}

/// Talks to repositories through the `git` executable.
pub struct GitCli {
    program: PathBuf,
    timeouts: GitTimeouts,
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git", GitTimeouts::default())
    }

    pub fn with_program(program: impl Into<PathBuf>, timeouts: GitTimeouts) -> Self {
        Self {
            program: program.into(),
            timeouts,
        }
    }

    async fn capture(
        &self,
        operation: &'static str,
        args: Vec<OsString>,
        limit: Duration,
    ) -> FetchOutcome<String> {
        debug!(operation, ?args, "running git");
        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(limit, command.output()).await {
            Err(_) => {
                return Err(FetchFailure::TimedOut {
                    operation,
                    seconds: limit.as_secs(),
                });
            }
            Ok(Err(err)) => {
                return Err(FetchFailure::Spawn {
                    operation,
                    reason: err.to_string(),
                });
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(FetchFailure::Exit {
                operation,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn show(
        &self,
        operation: &'static str,
        repo: &Path,
        flags: &[&str],
        commit_id: &str,
        limit: Duration,
    ) -> FetchOutcome<String> {
        let mut args = in_repo(repo, "show");
        args.extend(flags.iter().map(OsString::from));
        args.push(commit_id.into());
        self.capture(operation, args, limit).await
    }

    async fn global_config(&self, key: &str) -> Option<String> {
        let args = vec!["config".into(), "--global".into(), key.into()];
        match self.capture("identity query", args, self.timeouts.identity).await {
            Ok(value) => Some(value.trim().to_string()).filter(|v| !v.is_empty()),
            Err(failure) => {
                debug!(key, %failure, "no global git identity value");
                None
            }
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn commit_log(
        &self,
        repo: &Path,
        window: &DayWindow,
        author: Option<&str>,
    ) -> FetchOutcome<Vec<CommitHeader>> {
        let mut args = in_repo(repo, "log");
        args.push(format!("--since={}", window.since()).into());
        args.push(format!("--until={}", window.until()).into());
        args.push(LOG_FORMAT.into());
        args.push("--all".into());
        if let Some(author) = author {
            args.push("--author".into());
            args.push(author.into());
        }

        let stdout = self.capture("log query", args, self.timeouts.log).await?;
        Ok(parse_log(&stdout))
    }

    async fn changed_files(&self, repo: &Path, commit_id: &str) -> FetchOutcome<Vec<String>> {
        let stdout = self
            .show(
                "file list query",
                repo,
                &["--name-only", "--format="],
                commit_id,
                self.timeouts.file_list,
            )
            .await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn line_stats(&self, repo: &Path, commit_id: &str) -> FetchOutcome<LineStats> {
        let stdout = self
            .show(
                "stat query",
                repo,
                &["--stat", "--format="],
                commit_id,
                self.timeouts.stat,
            )
            .await?;
        Ok(parse_stat_summary(&stdout))
    }

    async fn diff_text(&self, repo: &Path, commit_id: &str) -> FetchOutcome<String> {
        self.show(
            "diff query",
            repo,
            &["--format=", "-p", "--no-color"],
            commit_id,
            self.timeouts.diff,
        )
        .await
    }

    async fn remote_url(&self, repo: &Path) -> FetchOutcome<String> {
        let mut args = in_repo(repo, "remote");
        args.push("get-url".into());
        args.push("origin".into());
        let stdout = self
            .capture("remote url query", args, self.timeouts.remote)
            .await?;
        Ok(stdout.trim().to_string())
    }

    async fn identity(&self) -> Identity {
        Identity {
            name: self.global_config("user.name").await,
            email: self.global_config("user.email").await,
        }
    }
}

fn in_repo(repo: &Path, subcommand: &str) -> Vec<OsString> {
    vec!["-C".into(), repo.as_os_str().to_owned(), subcommand.into()]
}

/// Parses `LOG_FORMAT` output, one commit per line. Lines that do not carry
/// all four fields or a readable timestamp are dropped.
fn parse_log(stdout: &str) -> Vec<CommitHeader> {
    stdout
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut fields = line.splitn(4, FIELD_SEPARATOR);
            let (Some(id), Some(author), Some(date), Some(message)) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                debug!(line, "skipping incomplete log line");
                return None;
            };
            let timestamp = match DateTime::parse_from_str(date.trim(), TIMESTAMP_FORMAT) {
                Ok(timestamp) => timestamp,
                Err(err) => {
                    warn!(commit = id, date, %err, "unreadable commit timestamp");
                    return None;
                }
            };
            Some(CommitHeader {
                id: id.to_string(),
                author: author.to_string(),
                timestamp,
                message: message.to_string(),
            })
        })
        .collect()
}
