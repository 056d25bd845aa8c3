//! Cached explorer session over an [`InventoryStore`].
//!
//! [`ExplorerSession`] pairs the store with the current [`FilterSpec`] and
//! memoizes the derived statistics. The cache is keyed on the store
//! generation and the filter, so it is recomputed only after a mutation or a
//! filter change; callers use [`ExplorerSession::snapshot`] to obtain a
//! fresh-or-cached [`Snapshot`].

use inventory_core::error::Result;
use inventory_core::models::{FilterSpec, Resource};
use inventory_data::aggregator::{
    Aggregates, CategoryDetail, InventoryAggregator, InventorySummary, TagCoverage,
};
use inventory_data::exporter;
use serde::Serialize;

use crate::store::{BatchReport, InventoryStore, Upload};

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Derived statistics for one (store generation, filter) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub summary: InventorySummary,
    pub aggregates: Aggregates,
    pub tag_coverage: TagCoverage,
    /// Resources in the filtered view.
    pub filtered: usize,
    /// Resources in the whole store.
    pub total: usize,
}

struct CacheEntry {
    generation: u64,
    filter: FilterSpec,
    snapshot: Snapshot,
}

// ── ExplorerSession ───────────────────────────────────────────────────────────

/// Store, active filter and memoized statistics.
pub struct ExplorerSession {
    store: InventoryStore,
    filter: FilterSpec,
    cache: Option<CacheEntry>,
}

impl ExplorerSession {
    pub fn new(store: InventoryStore) -> Self {
        Self {
            store,
            filter: FilterSpec::all(),
            cache: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
    }

    /// Resources matching the active filter, in canonical order.
    pub fn view(&self) -> Vec<&Resource> {
        self.store.filter(&self.filter)
    }

    /// Statistics for the active filter, recomputed only when stale.
    pub fn snapshot(&mut self) -> &Snapshot {
        let entry = match self.cache.take() {
            Some(entry) if self.is_entry_valid(&entry) => {
                tracing::debug!("returning cached snapshot");
                entry
            }
            _ => {
                let snapshot = self.compute();
                tracing::debug!(
                    generation = self.store.generation(),
                    filtered = snapshot.filtered,
                    total = snapshot.total,
                    "snapshot recomputed"
                );
                CacheEntry {
                    generation: self.store.generation(),
                    filter: self.filter.clone(),
                    snapshot,
                }
            }
        };
        &self.cache.insert(entry).snapshot
    }

    /// Discard the current cache, forcing the next [`snapshot`](Self::snapshot) to recompute.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        tracing::debug!("cache invalidated");
    }

    /// Per-service breakdown of one category within the active view.
    pub fn category_detail(&self, category: &str) -> Option<CategoryDetail> {
        InventoryAggregator::category_detail(&self.view(), category)
    }

    /// CSV bytes for the active view.
    pub fn export(&self) -> Result<Vec<u8>> {
        exporter::export_csv(&self.view())
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    pub async fn ingest_batch(&mut self, uploads: Vec<Upload>) -> Result<BatchReport> {
        self.store.ingest_batch(uploads).await
    }

    /// Remove one file; a source-file filter naming it falls back to "all".
    pub fn remove_file(&mut self, name: &str) -> usize {
        let removed = self.store.remove_file(name);
        if self.filter.source_file.as_deref() == Some(name) {
            self.filter.source_file = None;
        }
        removed
    }

    /// Empty the store and reset the source-file selection.
    pub fn clear_all(&mut self) {
        self.store.clear_all();
        self.filter.source_file = None;
    }

    // ── Private helpers ───────────────────────────────────────────────────

    #[cfg(test)]
    fn is_cache_valid(&self) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|entry| self.is_entry_valid(entry))
    }

    fn is_entry_valid(&self, entry: &CacheEntry) -> bool {
        entry.generation == self.store.generation() && entry.filter == self.filter
    }

    fn compute(&self) -> Snapshot {
        let view = self.view();
        Snapshot {
            summary: InventoryAggregator::summary(&view),
            aggregates: InventoryAggregator::aggregate(&view),
            tag_coverage: InventoryAggregator::tag_coverage(&view),
            filtered: view.len(),
            total: self.store.len(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
