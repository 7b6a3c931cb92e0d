//! WorkerExecutor implementation.
//!
//! The production [`QueryExecutor`]: every call becomes one `query.execute`
//! request to the worker process.

use std::sync::Arc;

use async_trait::async_trait;

use super::executor::{ExecutionMode, QueryExecutor, QueryResult};
use crate::config::{Settings, SettingsError};
use crate::worker::protocol::ConnectionParams;
use crate::worker::{WorkerClient, WorkerResult};

/// QueryExecutor backed by a [`WorkerClient`].
///
/// # Example
///
/// ```ignore
/// use bqframe::execution::WorkerExecutor;
/// use bqframe::worker::WorkerClient;
///
/// let client = WorkerClient::spawn("./bqframe-worker").await?;
/// let executor = WorkerExecutor::with_client(client, "bigquery", "my-project");
/// ```
pub struct WorkerExecutor {
    client: Arc<WorkerClient>,
    connection: ConnectionParams,
}

impl WorkerExecutor {
    /// Create a new executor over a shared client.
    pub fn new(
        client: Arc<WorkerClient>,
        driver: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            client,
            connection: ConnectionParams {
                driver: driver.into(),
                connection_string: connection_string.into(),
            },
        }
    }

    /// Create a new executor that owns its client.
    pub fn with_client(
        client: WorkerClient,
        driver: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self::new(Arc::new(client), driver, connection_string)
    }

    /// Create an executor using the `[connection]` section of `settings`.
    pub fn from_settings(
        client: Arc<WorkerClient>,
        settings: &Settings,
    ) -> Result<Self, SettingsError> {
        let connection_string = settings.connection.resolved_connection_string()?;
        Ok(Self::new(
            client,
            settings.connection.driver.clone(),
            connection_string,
        ))
    }

    pub fn driver(&self) -> &str {
        &self.connection.driver
    }

    pub fn connection_string(&self) -> &str {
        &self.connection.connection_string
    }
}

#[async_trait]
impl QueryExecutor for WorkerExecutor {
    async fn execute(&self, sql: &str, mode: ExecutionMode) -> WorkerResult<QueryResult> {
        let response = self
            .client
            .execute_query(&self.connection, sql, mode.is_dry_run())
            .await?;

        Ok(QueryResult::new(response.schema, response.rows))
    }
}
