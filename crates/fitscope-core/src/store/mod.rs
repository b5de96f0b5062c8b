//! # Fit Storage
//!
//! The `FitStore` trait is the executor seam between the engine and wherever
//! fits are persisted. Executors receive a built `FitFilter` and must return
//! matching fits newest first, bounded by `FitFilter::limit`.
//!
//! Two executors ship with the crate:
//! - `MemoryStore`: a `BTreeMap`, used by tests and the `memory` backend
//! - `RedbStore`: a redb database, ACID and persistent

mod redb_store;

pub use redb_store::RedbStore;

use crate::predicate::FitFilter;
use crate::primitives::MAX_INGEST_BATCH;
use crate::{FitId, FitRecord, FitscopeError};
use std::collections::BTreeMap;

// =============================================================================
// FITSTORE TRAIT
// =============================================================================

/// Storage operations over recorded fits.
///
/// Implementations must not retry internally; failures are returned as
/// `FitscopeError::Store` and propagated unchanged by the engine.
pub trait FitStore {
    /// Fits satisfying `filter`, ordered by id descending, at most `filter.limit()`.
    fn select(&self, filter: &FitFilter) -> Result<Vec<FitRecord>, FitscopeError>;

    /// A single fit by id.
    fn get(&self, id: FitId) -> Result<Option<FitRecord>, FitscopeError>;

    /// Insert or replace a fit.
    fn insert(&mut self, record: FitRecord) -> Result<(), FitscopeError>;

    /// Insert or replace many fits. Returns the number written.
    fn insert_batch(&mut self, records: &[FitRecord]) -> Result<usize, FitscopeError> {
        check_batch(records)?;
        for record in records {
            self.insert(record.clone())?;
        }
        Ok(records.len())
    }

    /// Number of stored fits.
    fn len(&self) -> Result<usize, FitscopeError>;

    fn is_empty(&self) -> Result<bool, FitscopeError> {
        Ok(self.len()? == 0)
    }
}

fn check_batch(records: &[FitRecord]) -> Result<(), FitscopeError> {
    if records.len() > MAX_INGEST_BATCH {
        return Err(FitscopeError::InvalidInput(format!(
            "Batch of {} fits exceeds maximum {}",
            records.len(),
            MAX_INGEST_BATCH
        )));
    }
    Ok(())
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile fit store backed by a `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    fits: BTreeMap<FitId, FitRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<FitRecord> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = FitRecord>>(iter: I) -> Self {
        Self {
            fits: iter.into_iter().map(|fit| (fit.id, fit)).collect(),
        }
    }
}

impl FitStore for MemoryStore {
    fn select(&self, filter: &FitFilter) -> Result<Vec<FitRecord>, FitscopeError> {
        Ok(self
            .fits
            .values()
            .rev()
            .filter(|fit| filter.matches(&fit.components()))
            .take(filter.limit())
            .cloned()
            .collect())
    }

    fn get(&self, id: FitId) -> Result<Option<FitRecord>, FitscopeError> {
        Ok(self.fits.get(&id).cloned())
    }

    fn insert(&mut self, record: FitRecord) -> Result<(), FitscopeError> {
        self.fits.insert(record.id, record);
        Ok(())
    }

    fn len(&self) -> Result<usize, FitscopeError> {
        Ok(self.fits.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemId;
    use crate::predicate::{FacetSelection, build_filter};

    fn fit(id: u64, ship: u32, hi: &[u32]) -> FitRecord {
        let mut record = FitRecord::new(FitId(id), ItemId(ship), 0);
        record.hi = hi.iter().map(|i| ItemId(*i)).collect();
        record
    }

    #[test]
    fn select_is_newest_first_and_bounded() {
        let store: MemoryStore = (1..=250).map(|id| fit(id, 587, &[])).collect();
        let rows = store.select(&FitFilter::all()).expect("select");
        assert_eq!(rows.len(), 100);
        assert_eq!(rows[0].id, FitId(250));
        assert_eq!(rows[99].id, FitId(151));
    }

    #[test]
    fn select_applies_filter() {
        let store: MemoryStore = vec![fit(1, 587, &[10]), fit(2, 588, &[10]), fit(3, 587, &[11])]
            .into_iter()
            .collect();
        let catalog = crate::Catalog::default();
        let planned = build_filter(&catalog, &FacetSelection::new().with_ship(587).with_item(10));
        let rows = store.select(&planned.filter).expect("select");
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![FitId(1)]);
    }

    #[test]
    fn insert_replaces_by_id() {
        let mut store = MemoryStore::new();
        store.insert(fit(1, 587, &[])).expect("insert");
        store.insert(fit(1, 588, &[])).expect("insert");
        assert_eq!(store.len().expect("len"), 1);
        assert_eq!(store.get(FitId(1)).expect("get").map(|f| f.ship), Some(ItemId(588)));
        assert!(store.get(FitId(2)).expect("get").is_none());
    }

    #[test]
    fn insert_batch_counts_records() {
        let mut store = MemoryStore::new();
        let written = store
            .insert_batch(&[fit(1, 587, &[]), fit(2, 587, &[])])
            .expect("batch");
        assert_eq!(written, 2);
        assert!(!store.is_empty().expect("is_empty"));
    }
}
