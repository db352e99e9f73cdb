use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackendError>;

/// Failure to obtain a usable answer from the analysis backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection refused, reset, DNS failure, ...
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend returned HTTP status {status}")]
    Status { status: u16 },

    /// Response does not have the expected envelope or shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Backend answered with an explicit error payload
    #[error("Backend error: {0}")]
    ErrorPayload(String),

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Failed to start backend process: {0}")]
    Spawn(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// True when the backend could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Spawn(_) | Self::Timeout { .. })
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Status {
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return Self::Malformed(err.to_string());
        }
        Self::Transport(err.to_string())
    }
}
