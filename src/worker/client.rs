//! Async client for the query worker process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use super::error::{WorkerError, WorkerResult};
use super::protocol::{
    methods, ConnectionParams, ErrorInfo, ExecuteQueryParams, ExecuteQueryResponse,
    RequestEnvelope, ResponseEnvelope,
};
use crate::config::Settings;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Handle on a running query worker.
///
/// Requests are written to the child's stdin one JSON object per line; a
/// background task reads stdout and hands each response to the caller
/// waiting on its id. Dropping the client stops the reader and kills the
/// child.
///
/// ```ignore
/// use bqframe::worker::{protocol::ConnectionParams, WorkerClient};
///
/// let client = WorkerClient::spawn("./bqframe-worker").await?;
/// let connection = ConnectionParams {
///     driver: "bigquery".into(),
///     connection_string: "my-project".into(),
/// };
/// let shape = client.execute_query(&connection, "SELECT 1 AS id", true).await?;
/// ```
pub struct WorkerClient {
    stdin: Mutex<BufWriter<ChildStdin>>,
    pending: PendingMap,
    reader: JoinHandle<()>,
    timeout: Duration,
    _child: Child,
}

impl WorkerClient {
    pub async fn spawn<P: AsRef<Path>>(worker_path: P) -> WorkerResult<Self> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Self::spawn_with_options(worker_path, &[], timeout).await
    }

    /// Spawn the worker named by the `[worker]` settings section.
    pub async fn spawn_with_settings(settings: &Settings) -> WorkerResult<Self> {
        let worker_path = configured_worker_path(settings)?;
        let timeout = Duration::from_secs(settings.worker.timeout_secs);
        Self::spawn_with_options(&worker_path, &settings.worker.args, timeout).await
    }

    pub async fn spawn_with_options<P: AsRef<Path>>(
        worker_path: P,
        args: &[String],
        timeout: Duration,
    ) -> WorkerResult<Self> {
        let worker_path = worker_path.as_ref();
        let mut child = Command::new(worker_path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let stdin = child.stdin.take().ok_or_else(|| not_captured("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| not_captured("stdout"))?;

        let pending: PendingMap = Arc::default();
        let reader = tokio::spawn(read_responses(stdout, Arc::clone(&pending)));

        tracing::debug!(
            worker = %worker_path.display(),
            timeout_secs = timeout.as_secs(),
            "spawned query worker"
        );

        Ok(Self {
            stdin: Mutex::new(BufWriter::new(stdin)),
            pending,
            reader,
            timeout,
            _child: child,
        })
    }

    /// Send `method` with `params` and decode the result as `R`.
    pub async fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let envelope = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
        };
        let mut line = serde_json::to_string(&envelope).map_err(WorkerError::SerializeFailed)?;
        line.push('\n');

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        if let Err(e) = self.write_line(&line).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(response) => decode_response(response?),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                tracing::warn!(method, request_id = %id, "worker request timed out");
                Err(WorkerError::Timeout(self.timeout.as_secs()))
            }
        }
    }

    /// Run `sql` through `query.execute`.
    pub async fn execute_query(
        &self,
        connection: &ConnectionParams,
        sql: &str,
        dry_run: bool,
    ) -> WorkerResult<ExecuteQueryResponse> {
        let params = ExecuteQueryParams {
            connection: connection.clone(),
            sql: sql.to_string(),
            dry_run,
        };
        self.request(methods::EXECUTE_QUERY, params).await
    }

    async fn write_line(&self, line: &str) -> WorkerResult<()> {
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(WorkerError::WriteFailed)?;
        stdin.flush().await.map_err(WorkerError::WriteFailed)
    }
}

impl Drop for WorkerClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

fn configured_worker_path(settings: &Settings) -> WorkerResult<PathBuf> {
    settings.worker_path().ok_or_else(|| {
        WorkerError::SpawnFailed(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "worker binary not found; set worker.path in bqframe.toml",
        ))
    })
}

fn not_captured(stream: &str) -> WorkerError {
    WorkerError::SpawnFailed(std::io::Error::other(format!("{} not captured", stream)))
}

/// Route each stdout line to its waiting request until the worker goes away.
async fn read_responses(stdout: ChildStdout, pending: PendingMap) {
    let mut lines = BufReader::new(stdout).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                Ok(response) => {
                    if let Some(tx) = pending.lock().await.remove(&response.id) {
                        let _ = tx.send(response);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "unparseable worker response"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "worker stdout read failed");
                break;
            }
        }
    }

    let mut pending = pending.lock().await;
    if !pending.is_empty() {
        tracing::warn!(outstanding = pending.len(), "worker exited with requests in flight");
    }
    for (id, tx) in pending.drain() {
        let _ = tx.send(ResponseEnvelope {
            id,
            success: false,
            result: None,
            error: Some(ErrorInfo {
                code: "WORKER_EXITED".to_string(),
                message: "worker process exited".to_string(),
            }),
        });
    }
}

fn decode_response<R: DeserializeOwned>(response: ResponseEnvelope) -> WorkerResult<R> {
    if !response.success {
        return Err(match response.error {
            Some(error) => WorkerError::classify(&error.code, &error.message),
            None => WorkerError::remote("UNKNOWN", "worker reported failure without details"),
        });
    }

    let result = response.result.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(result).map_err(WorkerError::DeserializeFailed)
}
