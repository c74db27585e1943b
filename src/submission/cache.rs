//! Terminal result cache keyed by transaction hash.

use dashmap::DashMap;
use std::sync::Arc;

use crate::observability::metrics;
use crate::submission::result::TransactionResult;
use crate::xdr::Hash;

/// Thread-safe cache of terminal results.
///
/// Results are immutable once terminal, so entries are never updated in
/// place; a second insert for the same hash keeps the first value.
#[derive(Clone, Default)]
pub struct ResultCache {
    inner: Arc<DashMap<Hash, TransactionResult>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a terminal result. Returns the cached value for the hash.
    pub fn insert(&self, result: TransactionResult) -> TransactionResult {
        let stored = self
            .inner
            .entry(result.hash())
            .or_insert(result)
            .value()
            .clone();
        metrics::record_cache_size(self.inner.len());
        stored
    }

    pub fn get(&self, hash: &Hash) -> Option<TransactionResult> {
        self.inner.get(hash).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Count of cached `(successes, failures)`.
    pub fn summary(&self) -> (usize, usize) {
        let mut success = 0;
        let mut failed = 0;
        for r in self.inner.iter() {
            if r.value().is_success() {
                success += 1;
            } else {
                failed += 1;
            }
        }
        (success, failed)
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache").field("len", &self.len()).finish()
    }
}
