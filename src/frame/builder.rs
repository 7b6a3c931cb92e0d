//! Session object: alias allocation, view registry, and execution.

use std::sync::Arc;

use super::alias::AliasAllocator;
use super::dataframe::DataFrame;
use super::deps::Dependencies;
use super::error::{FrameError, FrameResult};
use super::node::QueryNode;
use super::registry::ViewRegistry;
use crate::config::Settings;
use crate::execution::{ExecutionMode, QueryExecutor, QueryResult};
use crate::sql::Dialect;

/// State shared by every frame created from one [`Builder`].
pub(crate) struct Session {
    aliases: AliasAllocator,
    views: ViewRegistry,
    executor: Option<Arc<dyn QueryExecutor>>,
    dialect: Dialect,
}

impl Session {
    fn new(executor: Option<Arc<dyn QueryExecutor>>, dialect: Dialect) -> Self {
        Self {
            aliases: AliasAllocator::new(),
            views: ViewRegistry::new(),
            executor,
            dialect,
        }
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) fn views(&self) -> &ViewRegistry {
        &self.views
    }

    pub(crate) fn next_alias(&self) -> String {
        self.aliases.allocate_default()
    }

    /// Validate a caller-chosen alias against the registry and `dependencies`.
    pub(crate) fn check_alias(&self, alias: &str, dependencies: &Dependencies) -> FrameResult<()> {
        let views = self.views.aliases();
        AliasAllocator::validate(
            alias,
            views.iter().map(String::as_str).chain(dependencies.aliases()),
        )
    }

    /// Submit the compiled SQL of the frame aliased `alias` to the executor.
    pub(crate) async fn execute(
        &self,
        alias: &str,
        sql: String,
        mode: ExecutionMode,
    ) -> FrameResult<QueryResult> {
        let executor = self.executor.as_ref().ok_or(FrameError::Disconnected)?;

        tracing::debug!(alias = %alias, ?mode, "submitting query");
        tracing::trace!(sql = %sql, "query text");

        match executor.execute(&sql, mode).await {
            Ok(result) => {
                tracing::debug!(
                    columns = result.schema.len(),
                    rows = result.rows.len(),
                    "query finished"
                );
                Ok(result)
            }
            Err(source) => {
                tracing::warn!(alias = %alias, error = %source, "query failed");
                Err(FrameError::Execution { query: sql, source })
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("dialect", &self.dialect)
            .field("views", &self.views.aliases())
            .field("default_aliases", &self.aliases.allocated())
            .field("connected", &self.executor.is_some())
            .finish()
    }
}

/// Entry point for creating frames.
///
/// Cloning a builder is cheap and shares the session: default aliases keep
/// counting and registered views stay visible across clones. Separate
/// builders have fully independent sessions.
///
/// # Example
///
/// ```
/// use bqframe::frame::Builder;
///
/// let bq = Builder::offline();
/// let df = bq.sql("SELECT 1 AS id");
/// let filtered = df.filter("id > 0");
///
/// assert!(filtered.compile().starts_with("WITH `_default_alias_1` AS ("));
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    session: Arc<Session>,
}

impl Builder {
    /// Create a builder that executes queries through `executor`.
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self::with_dialect(executor, Dialect::default())
    }

    pub fn with_dialect(executor: Arc<dyn QueryExecutor>, dialect: Dialect) -> Self {
        Self {
            session: Arc::new(Session::new(Some(executor), dialect)),
        }
    }

    /// Create a builder that can compose and compile but not execute.
    pub fn offline() -> Self {
        Self::offline_with_dialect(Dialect::default())
    }

    pub fn offline_with_dialect(dialect: Dialect) -> Self {
        Self {
            session: Arc::new(Session::new(None, dialect)),
        }
    }

    /// Create a builder using the `[compile]` section of `settings`.
    pub fn from_settings(settings: &Settings, executor: Option<Arc<dyn QueryExecutor>>) -> Self {
        Self {
            session: Arc::new(Session::new(executor, settings.compile.dialect)),
        }
    }

    /// Frame over a table, e.g. `bigquery-public-data.samples.shakespeare`.
    pub fn table(&self, full_name: &str) -> DataFrame {
        let quoted = self.session.dialect.quote_path(full_name);
        self.sql(format!("SELECT * FROM {}", quoted))
    }

    /// Frame over a raw SQL query, under a fresh default alias.
    pub fn sql(&self, query: impl Into<String>) -> DataFrame {
        let alias = self.session.next_alias();
        self.root(query.into(), alias)
    }

    /// Frame over a raw SQL query, under an explicit alias.
    pub fn sql_as(&self, query: impl Into<String>, alias: &str) -> FrameResult<DataFrame> {
        self.session.check_alias(alias, &Dependencies::new())?;
        Ok(self.root(query.into(), alias.to_string()))
    }

    /// Make `frame` visible as `alias` to every query compiled in this session.
    ///
    /// Fails with [`FrameError::DuplicateAlias`] if the name is already
    /// registered. Views cannot be replaced.
    pub fn register_view(&self, alias: &str, frame: &DataFrame) -> FrameResult<()> {
        self.session.views.register(alias, Arc::clone(frame.node()))
    }

    /// Names of the registered views, in registration order.
    pub fn views(&self) -> Vec<String> {
        self.session.views.aliases()
    }

    pub fn dialect(&self) -> Dialect {
        self.session.dialect
    }

    /// Whether an executor is attached.
    pub fn is_connected(&self) -> bool {
        self.session.executor.is_some()
    }

    fn root(&self, fragment: String, alias: String) -> DataFrame {
        let node = QueryNode::new(fragment, alias, Dependencies::new());
        DataFrame::new(Arc::new(node), Arc::clone(&self.session))
    }
}
