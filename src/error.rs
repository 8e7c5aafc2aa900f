use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("language model error: {0}")]
    LanguageModel(String),
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("project registry error: {0}")]
    Registry(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Why a single external query produced no value.
///
/// Callers decide what default stands in for the missing value; a failure
/// here never aborts a scan on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("{operation} timed out after {seconds}s")]
    TimedOut {
        operation: &'static str,
        seconds: u64,
    },
    #[error("{operation} exited with status {code:?}: {stderr}")]
    Exit {
        operation: &'static str,
        code: Option<i32>,
        stderr: String,
    },
    #[error("{operation} could not be started: {reason}")]
    Spawn {
        operation: &'static str,
        reason: String,
    },
}

pub type FetchOutcome<T> = Result<T, FetchFailure>;
