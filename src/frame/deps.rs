//! Ordered, deduplicated dependency lists.
//!
//! A dependency list maps each CTE alias a node needs to the node that
//! defines it. Lists are built by concatenation and then deduplicated by
//! alias: a repeated alias keeps the position of its *first* occurrence and
//! the value of its *last* one.

use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;

use super::node::QueryNode;

/// Deduplicate key/value pairs by key, preserving first-seen order.
///
/// ```
/// use bqframe::frame::dedup_key_value;
///
/// let deduped = dedup_key_value([("a", 1), ("b", 2), ("a", 3)]);
/// assert_eq!(deduped, vec![("a", 3), ("b", 2)]);
/// ```
pub fn dedup_key_value<K, V, I>(pairs: I) -> Vec<(K, V)>
where
    K: Hash + Eq,
    I: IntoIterator<Item = (K, V)>,
{
    // IndexMap::insert keeps an existing key in place and overwrites its value.
    pairs.into_iter().collect::<IndexMap<K, V>>().into_iter().collect()
}

/// The CTEs a node's fragment requires, in emission order.
#[derive(Clone, Default)]
pub struct Dependencies {
    entries: IndexMap<String, Arc<QueryNode>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dependencies of a node derived from `parents`.
    ///
    /// Equivalent to `dedup(p1.deps ++ p2.deps ++ ... ++ [p1, p2, ...])`.
    pub fn lineage_of(parents: &[&Arc<QueryNode>]) -> Self {
        let inherited = parents.iter().flat_map(|parent| {
            parent
                .dependencies()
                .iter()
                .map(|(alias, node)| (alias.to_string(), Arc::clone(node)))
        });
        let direct = parents
            .iter()
            .map(|parent| (parent.alias().to_string(), Arc::clone(parent)));

        inherited.chain(direct).collect()
    }

    /// Iterate `(alias, node)` pairs in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<QueryNode>)> {
        self.entries.iter().map(|(alias, node)| (alias.as_str(), node))
    }

    /// Iterate aliases in emission order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, alias: &str) -> Option<&Arc<QueryNode>> {
        self.entries.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Arc<QueryNode>)> for Dependencies {
    fn from_iter<T: IntoIterator<Item = (String, Arc<QueryNode>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.aliases()).finish()
    }
}
