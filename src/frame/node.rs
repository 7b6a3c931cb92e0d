//! The immutable unit of lazy query composition.

use tokio::sync::OnceCell;

use super::deps::Dependencies;
use super::schema::SchemaField;

/// One SQL fragment plus the named sub-queries it needs as CTEs.
///
/// Nodes never change after construction and are shared by `Arc` between
/// every node that depends on them. The only interior state is the schema
/// cache, which is written at most once.
pub struct QueryNode {
    fragment: String,
    alias: String,
    dependencies: Dependencies,
    schema: OnceCell<Vec<SchemaField>>,
}

impl QueryNode {
    pub(crate) fn new(
        fragment: impl Into<String>,
        alias: impl Into<String>,
        dependencies: Dependencies,
    ) -> Self {
        Self {
            fragment: fragment.into(),
            alias: alias.into(),
            dependencies,
            schema: OnceCell::new(),
        }
    }

    /// Same fragment and dependencies under another alias.
    ///
    /// The fragment is identical, so an already-cached schema carries over.
    pub(crate) fn renamed(&self, alias: impl Into<String>) -> Self {
        Self {
            fragment: self.fragment.clone(),
            alias: alias.into(),
            dependencies: self.dependencies.clone(),
            schema: OnceCell::new_with(self.schema.get().cloned()),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// The schema, if it has already been resolved.
    pub fn cached_schema(&self) -> Option<&[SchemaField]> {
        self.schema.get().map(Vec::as_slice)
    }

    pub(crate) fn schema_cell(&self) -> &OnceCell<Vec<SchemaField>> {
        &self.schema
    }
}

impl std::fmt::Debug for QueryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryNode")
            .field("alias", &self.alias)
            .field("fragment", &self.fragment)
            .field("dependencies", &self.dependencies)
            .field("schema_cached", &self.schema.initialized())
            .finish()
    }
}

impl std::fmt::Display for QueryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) as {}", self.fragment, self.alias)
    }
}
