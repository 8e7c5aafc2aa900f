use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const DIFF_CHAR_LIMIT: usize = 4000;
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Insertion and deletion counts for one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStats {
    pub insertions: u64,
    pub deletions: u64,
}

/// One commit as seen on the scanned day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    pub author: String,
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
    pub changed_files: Vec<String>,
    pub insertions: u64,
    pub deletions: u64,
    pub diff_text: String,
}

impl CommitRecord {
    pub fn new(
        header: CommitHeader,
        changed_files: Vec<String>,
        stats: LineStats,
        diff: &str,
    ) -> Self {
        Self {
            id: header.id,
            author: header.author,
            timestamp: header.timestamp,
            message: header.message,
            changed_files,
            insertions: stats.insertions,
            deletions: stats.deletions,
            diff_text: bound_diff(diff),
        }
    }

    pub fn is_merge(&self) -> bool {
        self.message
            .get(..5)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("merge"))
    }
}

/// The part of a commit the history query reports directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHeader {
    pub id: String,
    pub author: String,
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
}

/// Commits found in one repository for the scanned day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryCommitSet {
    pub path: PathBuf,
    pub display_name: String,
    pub remote_url: Option<String>,
    pub commits: Vec<CommitRecord>,
}

impl RepositoryCommitSet {
    pub fn total_stats(&self) -> LineStats {
        self.commits.iter().fold(LineStats::default(), |acc, commit| LineStats {
            insertions: acc.insertions + commit.insertions,
            deletions: acc.deletions + commit.deletions,
        })
    }

    pub fn files_changed(&self) -> usize {
        self.commits.iter().map(|c| c.changed_files.len()).sum()
    }
}

fn bound_diff(diff: &str) -> String {
    let trimmed = diff.trim();
    match trimmed.char_indices().nth(DIFF_CHAR_LIMIT) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
