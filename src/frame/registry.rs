//! Session-wide named views.

use std::sync::Arc;

use parking_lot::RwLock;

use super::alias::AliasAllocator;
use super::error::FrameResult;
use super::node::QueryNode;

/// Append-only list of views visible to every query compiled in a session.
///
/// There is no replace path: a name can be registered once per session.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: RwLock<Vec<(String, Arc<QueryNode>)>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under `alias`.
    ///
    /// The duplicate check and the append happen under one write lock, so of
    /// two concurrent registrations of the same name exactly one fails.
    pub fn register(&self, alias: &str, node: Arc<QueryNode>) -> FrameResult<()> {
        let mut views = self.views.write();
        AliasAllocator::validate(alias, views.iter().map(|(a, _)| a.as_str()))?;
        tracing::debug!(view = %alias, source = %node.alias(), "registered view");
        views.push((alias.to_string(), node));
        Ok(())
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.views.read().iter().any(|(a, _)| a == alias)
    }

    /// View names in registration order.
    pub fn aliases(&self) -> Vec<String> {
        self.views.read().iter().map(|(a, _)| a.clone()).collect()
    }

    /// Copy of the current entries, taken under a single read lock.
    pub fn snapshot(&self) -> Vec<(String, Arc<QueryNode>)> {
        self.views.read().clone()
    }

    pub fn len(&self) -> usize {
        self.views.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.read().is_empty()
    }
}
