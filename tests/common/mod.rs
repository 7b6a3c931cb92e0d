//! Shared test doubles for frame integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bqframe::execution::{ExecutionMode, QueryExecutor, QueryResult};
use bqframe::frame::SchemaField;
use bqframe::worker::{WorkerError, WorkerResult};
use parking_lot::Mutex;

/// Executor that answers from canned results and records every call.
///
/// A rule matches when the submitted SQL ends with its suffix; the first
/// matching rule wins. Unmatched SQL is answered with `INVALID_QUERY`.
#[derive(Default)]
pub struct RecordingExecutor {
    rules: Vec<(String, QueryResult)>,
    calls: Mutex<Vec<(String, ExecutionMode)>>,
    fail_with: Option<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any SQL ending with `suffix`.
    pub fn on(mut self, suffix: &str, result: QueryResult) -> Self {
        self.rules.push((suffix.to_string(), result));
        self
    }

    /// Answer the zero-row schema query of the frame aliased `alias`.
    pub fn on_schema(self, alias: &str, schema: Vec<SchemaField>) -> Self {
        let suffix = format!("SELECT * FROM {} LIMIT 0", alias);
        self.on(&suffix, QueryResult::shape(schema))
    }

    /// Fail every request with an `INVALID_QUERY` carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, ExecutionMode)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute(&self, sql: &str, mode: ExecutionMode) -> WorkerResult<QueryResult> {
        self.calls.lock().push((sql.to_string(), mode));
        tokio::task::yield_now().await;

        if let Some(message) = &self.fail_with {
            return Err(WorkerError::InvalidQuery(message.clone()));
        }

        self.rules
            .iter()
            .find(|(suffix, _)| sql.ends_with(suffix.as_str()))
            .map(|(_, result)| result.clone())
            .ok_or_else(|| WorkerError::InvalidQuery(format!("no canned result for: {}", sql)))
    }
}

pub fn int_field(name: &str) -> SchemaField {
    SchemaField::new(name, "INTEGER")
}

pub fn string_field(name: &str) -> SchemaField {
    SchemaField::new(name, "STRING")
}
