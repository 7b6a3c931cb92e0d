//! Error types for query composition and execution.

use thiserror::Error;

use crate::worker::WorkerError;

/// Result type for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors raised while composing, compiling, or executing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// An explicit alias collides with a view or dependency already in scope.
    #[error("Duplicate alias {0}")]
    DuplicateAlias(String),

    /// `union_by_name` was asked to align frames whose column sets differ.
    #[error(
        "UnionByName: frames must have the same columns, unless allow_missing_columns is set to true.\n\
         Columns in first frame: [{}]\n\
         Columns in second frame: [{}]",
        .left.join(", "),
        .right.join(", ")
    )]
    SchemaMismatch {
        /// Columns of the left-hand frame, in order.
        left: Vec<String>,
        /// Columns of the right-hand frame, in order.
        right: Vec<String>,
    },

    /// A structurally invalid call (negative limit, empty projection, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The execution collaborator failed while running a compiled query.
    #[error("Query execution failed: {source}\nQuery:\n{query}")]
    Execution {
        /// The compiled SQL that was submitted.
        query: String,
        #[source]
        source: WorkerError,
    },

    /// Execution was requested from a builder created without an executor.
    #[error("No query executor attached to this session")]
    Disconnected,

    /// The executor answered, but not with the shape the operation needs.
    #[error("Unexpected query result: {0}")]
    UnexpectedResult(String),
}

impl FrameError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Check if this error came from the execution collaborator.
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }
}
