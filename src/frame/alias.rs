//! Alias allocation and validation.

use std::sync::atomic::{AtomicU64, Ordering};

use super::error::{FrameError, FrameResult};

/// Prefix of allocator-generated aliases.
pub const DEFAULT_ALIAS_PREFIX: &str = "_default_alias_";

/// Hands out `_default_alias_{n}` names with a strictly increasing `n`.
///
/// The counter is atomic, so frames built concurrently from one session never
/// receive the same default alias.
#[derive(Debug, Default)]
pub struct AliasAllocator {
    counter: AtomicU64,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh default alias. Numbering starts at 1.
    pub fn allocate_default(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let alias = format!("{}{}", DEFAULT_ALIAS_PREFIX, n);
        tracing::trace!(alias = %alias, "allocated default alias");
        alias
    }

    /// Number of default aliases handed out so far.
    pub fn allocated(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Fail with [`FrameError::DuplicateAlias`] if `candidate` is already visible.
    ///
    /// Only caller-supplied aliases go through this check; generated aliases
    /// are unique by construction.
    pub fn validate<'a, I>(candidate: &str, visible: I) -> FrameResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if visible.into_iter().any(|alias| alias == candidate) {
            return Err(FrameError::DuplicateAlias(candidate.to_string()));
        }
        Ok(())
    }
}
