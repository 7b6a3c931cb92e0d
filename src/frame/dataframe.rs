//! The user-facing lazy frame.
//!
//! Every composition method returns a new [`DataFrame`] whose node depends on
//! the receiver. Nothing touches the warehouse until one of the async
//! methods (`schema`, `columns`, `union_by_name`, `count`, `collect`, `take`)
//! needs an answer from it.

use std::sync::Arc;

use serde_json::Value;

use super::builder::Session;
use super::compile::CteCompiler;
use super::deps::Dependencies;
use super::error::{FrameError, FrameResult};
use super::node::QueryNode;
use super::schema::{column_names, tree_string, SchemaField};
use super::union::ColumnPartition;
use crate::execution::{ExecutionMode, Row};
use crate::sql::text::{cols_to_lines, cols_to_str};

/// A lazily evaluated query.
///
/// Cloning is cheap: the node graph is shared, never copied.
#[derive(Clone)]
pub struct DataFrame {
    node: Arc<QueryNode>,
    session: Arc<Session>,
}

impl DataFrame {
    pub(crate) fn new(node: Arc<QueryNode>, session: Arc<Session>) -> Self {
        Self { node, session }
    }

    /// Name under which dependants reference this frame.
    pub fn alias(&self) -> &str {
        self.node.alias()
    }

    /// The SQL fragment of this frame alone, without its CTEs.
    pub fn fragment(&self) -> &str {
        self.node.fragment()
    }

    pub fn node(&self) -> &Arc<QueryNode> {
        &self.node
    }

    pub fn dependencies(&self) -> &Dependencies {
        self.node.dependencies()
    }

    /// Compile to one executable statement.
    ///
    /// The registered views are read at call time, so registering a view
    /// changes the output of frames created before it.
    pub fn compile(&self) -> String {
        CteCompiler::new(self.session.dialect())
            .compile(&self.node, &self.session.views().snapshot())
    }

    // ========================================================================
    // Naming
    // ========================================================================

    /// Same query under an explicit alias.
    ///
    /// Fails with [`FrameError::DuplicateAlias`] if `alias` names a registered
    /// view or one of this frame's dependencies.
    pub fn alias_as(&self, alias: &str) -> FrameResult<DataFrame> {
        self.session.check_alias(alias, self.node.dependencies())?;
        Ok(self.with_node(self.node.renamed(alias)))
    }

    /// Register this frame as a session view named `alias`.
    pub fn create_temp_view(&self, alias: &str) -> FrameResult<()> {
        self.session.views().register(alias, Arc::clone(&self.node))
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// Project the given column expressions.
    pub fn select<I, S>(&self, columns: I) -> FrameResult<DataFrame>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(FrameError::invalid("select requires at least one column"));
        }

        Ok(self.derive(format!(
            "SELECT\n{}\nFROM {}",
            cols_to_lines(&columns, 2),
            self.alias()
        )))
    }

    /// Keep rows matching `predicate`.
    pub fn filter(&self, predicate: &str) -> DataFrame {
        self.derive(format!("SELECT *\nFROM {}\nWHERE {}", self.alias(), predicate))
    }

    /// Alias of [`DataFrame::filter`].
    pub fn r#where(&self, predicate: &str) -> DataFrame {
        self.filter(predicate)
    }

    /// Keep at most `n` rows.
    pub fn limit(&self, n: i64) -> FrameResult<DataFrame> {
        if n < 0 {
            return Err(FrameError::invalid(format!(
                "limit must be non-negative, got {}",
                n
            )));
        }
        Ok(self.derive(format!("SELECT * FROM {} LIMIT {}", self.alias(), n)))
    }

    /// Order rows by the given column expressions.
    pub fn sort<I, S>(&self, columns: I) -> FrameResult<DataFrame>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(FrameError::invalid("sort requires at least one column"));
        }

        Ok(self.derive(format!(
            "SELECT *\nFROM {}\nORDER BY {}",
            self.alias(),
            cols_to_str(&columns)
        )))
    }

    /// Alias of [`DataFrame::sort`].
    pub fn order_by<I, S>(&self, columns: I) -> FrameResult<DataFrame>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort(columns)
    }

    /// Add the column `name` computed by `expr`, or replace it when `replace`
    /// is set. Neither the name nor the expression is checked.
    pub fn with_column(&self, name: &str, expr: &str, replace: bool) -> DataFrame {
        let fragment = if replace {
            format!("SELECT * REPLACE ({} AS {}) FROM {}", expr, name, self.alias())
        } else {
            format!("SELECT *, {} AS {} FROM {}", expr, name, self.alias())
        };
        self.derive(fragment)
    }

    /// Positional `UNION ALL` with `other`.
    pub fn union(&self, other: &DataFrame) -> FrameResult<DataFrame> {
        let fragment = format!(
            "SELECT * FROM {} UNION ALL SELECT * FROM {}",
            self.alias(),
            other.alias()
        );
        self.derive_with(other, fragment)
    }

    /// Alias of [`DataFrame::union`].
    pub fn union_all(&self, other: &DataFrame) -> FrameResult<DataFrame> {
        self.union(other)
    }

    /// `UNION ALL` that matches columns by name.
    ///
    /// Output columns are the left-only columns, then the common ones, then
    /// the right-only ones; a side missing a column contributes `NULL`. With
    /// `allow_missing_columns` unset both frames must have the same column
    /// set, in any order.
    pub async fn union_by_name(
        &self,
        other: &DataFrame,
        allow_missing_columns: bool,
    ) -> FrameResult<DataFrame> {
        self.ensure_same_session(other)?;

        let left = self.columns().await?;
        let right = other.columns().await?;
        let partition = ColumnPartition::reconcile(&left, &right, allow_missing_columns)?;

        tracing::debug!(
            left = %self.alias(),
            right = %other.alias(),
            left_only = partition.left_only.len(),
            common = partition.common.len(),
            right_only = partition.right_only.len(),
            "union by name"
        );

        let fragment = partition.union_fragment(self.alias(), other.alias())?;
        self.derive_with(other, fragment)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Output schema, resolved once per frame with a zero-row dry run.
    ///
    /// Concurrent callers share a single request; failures are not cached.
    pub async fn schema(&self) -> FrameResult<&[SchemaField]> {
        let fields = self
            .node
            .schema_cell()
            .get_or_try_init(|| self.fetch_schema())
            .await?;
        Ok(fields.as_slice())
    }

    /// Top-level column names, in schema order.
    pub async fn columns(&self) -> FrameResult<Vec<String>> {
        Ok(column_names(self.schema().await?))
    }

    /// Schema rendered as an indented tree.
    pub async fn tree_string(&self) -> FrameResult<String> {
        Ok(tree_string(self.schema().await?))
    }

    /// Execute and return every row.
    pub async fn collect(&self) -> FrameResult<Vec<Row>> {
        let result = self
            .session
            .execute(self.alias(), self.compile(), ExecutionMode::Materialize)
            .await?;
        Ok(result.rows)
    }

    /// Execute and return at most `n` rows.
    pub async fn take(&self, n: i64) -> FrameResult<Vec<Row>> {
        self.limit(n)?.collect().await
    }

    /// Number of rows this frame produces.
    pub async fn count(&self) -> FrameResult<u64> {
        let counted = self.derive(format!("SELECT COUNT(1) FROM {}", self.alias()));
        let result = self
            .session
            .execute(counted.alias(), counted.compile(), ExecutionMode::Materialize)
            .await?;

        let cell = result
            .rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| FrameError::UnexpectedResult("count returned no rows".to_string()))?;

        parse_count(cell)
    }

    async fn fetch_schema(&self) -> FrameResult<Vec<SchemaField>> {
        let shape_query = self.limit(0)?;
        tracing::debug!(alias = %self.alias(), "resolving schema");
        let result = self
            .session
            .execute(shape_query.alias(), shape_query.compile(), ExecutionMode::DryRun)
            .await?;
        Ok(result.schema)
    }

    // ========================================================================
    // Derivation
    // ========================================================================

    fn with_node(&self, node: QueryNode) -> DataFrame {
        DataFrame::new(Arc::new(node), Arc::clone(&self.session))
    }

    /// New frame over `fragment`, reading from this one.
    fn derive(&self, fragment: String) -> DataFrame {
        let dependencies = Dependencies::lineage_of(&[&self.node]);
        let alias = self.session.next_alias();
        self.with_node(QueryNode::new(fragment, alias, dependencies))
    }

    /// New frame over `fragment`, reading from this one and `other`.
    fn derive_with(&self, other: &DataFrame, fragment: String) -> FrameResult<DataFrame> {
        self.ensure_same_session(other)?;
        let dependencies = Dependencies::lineage_of(&[&self.node, &other.node]);
        let alias = self.session.next_alias();
        Ok(self.with_node(QueryNode::new(fragment, alias, dependencies)))
    }

    fn ensure_same_session(&self, other: &DataFrame) -> FrameResult<()> {
        if Arc::ptr_eq(&self.session, &other.session) {
            Ok(())
        } else {
            Err(FrameError::invalid(format!(
                "frames {} and {} belong to different builders",
                self.alias(),
                other.alias()
            )))
        }
    }
}

fn parse_count(cell: &Value) -> FrameResult<u64> {
    match cell {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| FrameError::UnexpectedResult(format!("count returned {}", cell)))
}

impl std::fmt::Display for DataFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.node, f)
    }
}

impl std::fmt::Debug for DataFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.node, f)
    }
}
