//! # redb-backed Fit Storage
//!
//! A disk-backed fit store using the redb embedded database.
//!
//! - ACID transactions, crash safety (copy-on-write B-trees)
//! - MVCC: any number of concurrent readers while the server runs
//! - Records are postcard-encoded, keyed by fit id so a reverse range scan
//!   yields newest-first order directly

use super::{FitStore, check_batch};
use crate::predicate::FitFilter;
use crate::{FitId, FitRecord, FitscopeError};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for fits: FitId(u64) -> serialized FitRecord bytes
const FITS: TableDefinition<u64, &[u8]> = TableDefinition::new("fits");

fn store_err(e: impl std::fmt::Display) -> FitscopeError {
    FitscopeError::Store(e.to_string())
}

fn decode(bytes: &[u8]) -> Result<FitRecord, FitscopeError> {
    postcard::from_bytes(bytes).map_err(|e| FitscopeError::Serialization(e.to_string()))
}

fn encode(record: &FitRecord) -> Result<Vec<u8>, FitscopeError> {
    postcard::to_allocvec(record).map_err(|e| FitscopeError::Serialization(e.to_string()))
}

/// A persistent fit store.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a fit database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FitscopeError> {
        let db = Database::create(path.as_ref()).map_err(store_err)?;

        // Make sure the table exists so read transactions never see it missing.
        {
            let write_txn = db.begin_write().map_err(store_err)?;
            let _ = write_txn.open_table(FITS).map_err(store_err)?;
            write_txn.commit().map_err(store_err)?;
        }

        Ok(Self { db })
    }
}

impl FitStore for RedbStore {
    fn select(&self, filter: &FitFilter) -> Result<Vec<FitRecord>, FitscopeError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(FITS).map_err(store_err)?;

        let mut rows = Vec::new();
        for entry in table.iter().map_err(store_err)?.rev() {
            if rows.len() >= filter.limit() {
                break;
            }
            let (_, value) = entry.map_err(store_err)?;
            let record = decode(value.value())?;
            if filter.matches(&record.components()) {
                rows.push(record);
            }
        }
        Ok(rows)
    }

    fn get(&self, id: FitId) -> Result<Option<FitRecord>, FitscopeError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(FITS).map_err(store_err)?;
        table
            .get(id.0)
            .map_err(store_err)?
            .map(|value| decode(value.value()))
            .transpose()
    }

    fn insert(&mut self, record: FitRecord) -> Result<(), FitscopeError> {
        self.insert_batch(std::slice::from_ref(&record)).map(|_| ())
    }

    /// Write every record in a single transaction.
    ///
    /// Records are encoded before the transaction opens, so an encoding
    /// failure leaves the database untouched.
    fn insert_batch(&mut self, records: &[FitRecord]) -> Result<usize, FitscopeError> {
        check_batch(records)?;
        if records.is_empty() {
            return Ok(0);
        }

        let encoded = records
            .iter()
            .map(|record| encode(record).map(|bytes| (record.id, bytes)))
            .collect::<Result<Vec<_>, _>>()?;

        let write_txn = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = write_txn.open_table(FITS).map_err(store_err)?;
            for (id, bytes) in &encoded {
                table.insert(id.0, bytes.as_slice()).map_err(store_err)?;
            }
        }
        write_txn.commit().map_err(store_err)?;

        Ok(encoded.len())
    }

    fn len(&self) -> Result<usize, FitscopeError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(FITS).map_err(store_err)?;
        let count = table.len().map_err(store_err)?;
        Ok(count as usize)
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
    use tempfile::tempdir;

    fn fit(id: u64, ship: u32, low: &[u32]) -> FitRecord {
        let mut record = FitRecord::new(FitId(id), ItemId(ship), id as i64 * 1_000);
        record.low = low.iter().map(|i| ItemId(*i)).collect();
        record
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("fits.redb");
        {
            let mut store = RedbStore::open(&path).expect("open");
            store.insert(fit(7, 587, &[2048])).expect("insert");
        }
        let store = RedbStore::open(&path).expect("reopen");
        assert_eq!(store.len().expect("len"), 1);
        assert_eq!(store.get(FitId(7)).expect("get"), Some(fit(7, 587, &[2048])));
        assert_eq!(store.get(FitId(8)).expect("get"), None);
    }

    #[test]
    fn select_is_newest_first_and_filtered() {
        let dir = tempdir().expect("tempdir");
        let mut store = RedbStore::open(dir.path().join("fits.redb")).expect("open");
        store
            .insert_batch(&[
                fit(1, 587, &[2048]),
                fit(2, 587, &[]),
                fit(3, 587, &[2048]),
                fit(4, 603, &[2048]),
            ])
            .expect("batch");

        let catalog = crate::Catalog::default();
        let planned = build_filter(&catalog, &FacetSelection::new().with_ship(587).with_item(2048));
        let ids: Vec<FitId> = store
            .select(&planned.filter)
            .expect("select")
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![FitId(3), FitId(1)]);
    }

    #[test]
    fn select_stops_at_limit() {
        let dir = tempdir().expect("tempdir");
        let mut store = RedbStore::open(dir.path().join("fits.redb")).expect("open");
        let fits: Vec<FitRecord> = (1..=130).map(|id| fit(id, 587, &[])).collect();
        assert_eq!(store.insert_batch(&fits).expect("batch"), 130);

        let rows = store.select(&FitFilter::all()).expect("select");
        assert_eq!(rows.len(), 100);
        assert_eq!(rows.first().map(|f| f.id), Some(FitId(130)));
        assert_eq!(rows.last().map(|f| f.id), Some(FitId(31)));
    }
}
