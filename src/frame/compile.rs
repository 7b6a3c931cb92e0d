//! Dependency flattening: node graph → one `WITH ... <query>` statement.
//!
//! ```text
//! WITH `view_1` AS (            ┐ registry views, each a self-contained
//!   <view's own WITH + query>   │ compilation (views do not share scope
//! )                             ┘ with the node being compiled)
//! , `_default_alias_1` AS (     ┐ the node's dependency list, bare
//!   <dependency fragment>       │ fragments in stored order
//! )                             ┘
//! <node fragment>
//! ```

use std::sync::Arc;

use super::node::QueryNode;
use crate::sql::text::indent;
use crate::sql::Dialect;

/// Renders nodes and registry views into a single SQL statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct CteCompiler {
    dialect: Dialect,
}

impl CteCompiler {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Compile `node` with the given registry views prepended.
    pub fn compile(&self, node: &QueryNode, views: &[(String, Arc<QueryNode>)]) -> String {
        let mut ctes = self.view_blocks(views);
        ctes.extend(self.dependency_blocks(node));

        tracing::debug!(
            alias = %node.alias(),
            views = views.len(),
            dependencies = node.dependencies().len(),
            dialect = %self.dialect,
            "compiled query"
        );

        with_ctes(&ctes, node.fragment())
    }

    /// Compile `node` using only its own dependencies.
    ///
    /// This is the body used for a registered view.
    pub fn compile_standalone(&self, node: &QueryNode) -> String {
        with_ctes(&self.dependency_blocks(node), node.fragment())
    }

    fn view_blocks(&self, views: &[(String, Arc<QueryNode>)]) -> Vec<String> {
        views
            .iter()
            .map(|(alias, view)| self.cte_block(alias, &self.compile_standalone(view)))
            .collect()
    }

    fn dependency_blocks(&self, node: &QueryNode) -> Vec<String> {
        node.dependencies()
            .iter()
            .map(|(alias, dep)| self.cte_block(alias, dep.fragment()))
            .collect()
    }

    fn cte_block(&self, alias: &str, body: &str) -> String {
        format!(
            "{} AS (\n{}\n)",
            self.dialect.cte_name(alias),
            indent(body, 2)
        )
    }
}

fn with_ctes(ctes: &[String], fragment: &str) -> String {
    if ctes.is_empty() {
        fragment.to_string()
    } else {
        format!("WITH {}\n{}", ctes.join("\n, "), fragment)
    }
}
