use std::path::Path;

use async_trait::async_trait;

use crate::domain::commit::{CommitHeader, LineStats};
use crate::domain::window::DayWindow;
use crate::error::FetchOutcome;

/// Who the local tool thinks the user is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn preferred(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.email.as_deref().filter(|email| !email.is_empty()))
    }
}

/// Read-only queries against one repository.
///
/// Each method is an independent fetch; a failure is reported, never
/// swallowed, and the caller picks the default.
#[async_trait]
pub trait VersionControlService: Send + Sync {
    async fn commit_log(
        &self,
        repo: &Path,
        window: &DayWindow,
        author: Option<&str>,
    ) -> FetchOutcome<Vec<CommitHeader>>;
    async fn changed_files(&self, repo: &Path, commit_id: &str) -> FetchOutcome<Vec<String>>;
    async fn line_stats(&self, repo: &Path, commit_id: &str) -> FetchOutcome<LineStats>;
    async fn diff_text(&self, repo: &Path, commit_id: &str) -> FetchOutcome<String>;
    async fn remote_url(&self, repo: &Path) -> FetchOutcome<String>;
    async fn identity(&self) -> Identity;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_name_over_email() {
        let identity = Identity {
            name: Some("Dana".to_string()),
            email: Some("dana@example.com".to_string()),
        };
        assert_eq!(identity.preferred(), Some("Dana"));
    }

    #[test]
    fn falls_back_to_email_when_name_blank() {
        let identity = Identity {
            name: Some(String::new()),
            email: Some("dana@example.com".to_string()),
        };
        assert_eq!(identity.preferred(), Some("dana@example.com"));
        assert_eq!(Identity::default().preferred(), None);
    }
}
