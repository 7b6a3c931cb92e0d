//! QueryExecutor trait definition.
//!
//! The trait is the boundary between query composition and the warehouse.
//! Composition never looks behind it: failures come back as [`WorkerError`]
//! and are passed through unchanged.
//!
//! [`WorkerError`]: crate::worker::WorkerError

use async_trait::async_trait;

use crate::frame::SchemaField;
use crate::worker::WorkerResult;

/// One result row, column values in schema order.
pub type Row = Vec<serde_json::Value>;

/// How much of a result the caller needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Result shape only, no rows.
    DryRun,
    /// Result shape and rows.
    Materialize,
}

impl ExecutionMode {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, ExecutionMode::DryRun)
    }
}

/// Shape and rows of an executed query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub schema: Vec<SchemaField>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(schema: Vec<SchemaField>, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    /// A result carrying only a shape.
    pub fn shape(schema: Vec<SchemaField>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }
}

/// Runs compiled SQL against a warehouse.
///
/// # Example
///
/// ```ignore
/// use bqframe::execution::{ExecutionMode, QueryExecutor};
///
/// async fn first_column(executor: &impl QueryExecutor) -> WorkerResult<()> {
///     let shape = executor.execute("SELECT 1 AS id LIMIT 0", ExecutionMode::DryRun).await?;
///     assert_eq!(shape.schema[0].name, "id");
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute `sql`. In [`ExecutionMode::DryRun`] implementations may skip
    /// fetching rows entirely.
    async fn execute(&self, sql: &str, mode: ExecutionMode) -> WorkerResult<QueryResult>;
}
