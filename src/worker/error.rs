//! Failures talking to the query worker.

use std::io;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Transport faults, plus the warehouse errors the worker reports back.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("failed to spawn worker process: {0}")]
    SpawnFailed(#[source] io::Error),

    #[error("failed to write to worker: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("failed to encode request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("failed to decode worker result: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// No response within the configured number of seconds.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The worker closed stdout with this request still outstanding.
    #[error("worker process exited unexpectedly")]
    WorkerExited,

    /// The reader task dropped the response slot without answering.
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Any error code without a dedicated variant.
    #[error("worker error: {message} (code: {code})")]
    Remote { code: String, message: String },
}

impl WorkerError {
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Turn an `{code, message}` error payload into a variant.
    pub fn classify(code: &str, message: &str) -> Self {
        let message = message.to_string();
        match code {
            "AUTHENTICATION_FAILED" => Self::AuthenticationFailed(message),
            "INVALID_QUERY" => Self::InvalidQuery(message),
            "QUOTA_EXCEEDED" => Self::QuotaExceeded(message),
            "CONNECTION_FAILED" => Self::ConnectionFailed(message),
            "WORKER_EXITED" => Self::WorkerExited,
            _ => Self::remote(code, message),
        }
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for WorkerError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelClosed
    }
}
