use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::analysis::AggregateAnalysis;
use crate::domain::commit::RepositoryCommitSet;
use crate::error::{AppError, AppResult};
use crate::infra::llm::{build_prompt, parse_analysis};
use crate::services::LanguageModelService;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs prompts through a locally installed `claude` executable.
pub struct ClaudeCliClient {
    program: String,
    timeout: Duration,
}

impl ClaudeCliClient {
    pub fn new() -> Self {
        Self {
            program: "claude".to_string(),
            timeout: ANALYSIS_TIMEOUT,
        }
    }

    /// True when `claude --version` answers successfully.
    pub async fn probe(&self) -> bool {
        let mut command = Command::new(&self.program);
        command
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        match tokio::time::timeout(PROBE_TIMEOUT, command.output()).await {
            Ok(Ok(output)) => output.status.success(),
            Ok(Err(err)) => {
                debug!(%err, "claude executable not available");
                false
            }
            Err(_) => false,
        }
    }
}

impl Default for ClaudeCliClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModelService for ClaudeCliClient {
    fn backend_name(&self) -> &str {
        "Claude CLI"
    }

    async fn analyze(&self, sets: &[RepositoryCommitSet]) -> AppResult<AggregateAnalysis> {
        let mut command = Command::new(&self.program);
        command
            .arg("-p")
            .arg(build_prompt(sets))
            .args(["--output-format", "text"])
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                AppError::LanguageModel(format!(
                    "Claude CLI timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|err| AppError::LanguageModel(format!("failed to run Claude CLI: {err}")))?;

        if !output.status.success() {
            return Err(AppError::LanguageModel(format!(
                "Claude CLI error: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_analysis(&String::from_utf8_lossy(&output.stdout), self.backend_name())
    }
}
