// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded transfer history store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `history`: composite key (!block_number|!log_index) → serialized HistoryEntry
//! - `scan_state`: key → value (cursor and the contract the rows belong to)
//!
//! Keys are stored inverted so that a forward scan yields newest-first order.

use std::path::Path;

use alloy::primitives::Address;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::blockchain::HistoryEntry;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: inverted (block_number, log_index) → HistoryEntry (JSON bytes).
const HISTORY: TableDefinition<&[u8], &[u8]> = TableDefinition::new("history");

/// Scan state: key → value bytes.
const SCAN_STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("scan_state");

/// Last block whose logs are fully persisted (u64 big-endian).
const CURSOR_KEY: &str = "last_scanned_block";

/// Contract address the stored rows were read from (20 bytes).
const CONTRACT_KEY: &str = "contract";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum HistoryDbError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt scan state: {0}")]
    Corrupt(String),
}

pub type HistoryDbResult<T> = Result<T, HistoryDbError>;

/// Build the composite key for a log position.
///
/// Both parts are bitwise inverted so higher (block, log_index) pairs sort
/// first.
fn make_key(block_number: u64, log_index: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&(!block_number).to_be_bytes());
    key[8..].copy_from_slice(&(!log_index).to_be_bytes());
    key
}

// =============================================================================
// HistoryDb
// =============================================================================

/// Persistent, newest-first store of `Transfer` events plus the scan cursor.
pub struct HistoryDb {
    db: Database,
}

impl HistoryDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> HistoryDbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(HISTORY)?;
            let _ = write_txn.open_table(SCAN_STATE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Bind the store to `contract`.
    ///
    /// Rows recorded for a different contract are dropped together with the
    /// cursor. Returns `true` when that happened.
    pub fn ensure_contract(&self, contract: Address) -> HistoryDbResult<bool> {
        let write_txn = self.db.begin_write()?;
        let reset = {
            let mut state = write_txn.open_table(SCAN_STATE)?;
            let stored = state
                .get(CONTRACT_KEY)?
                .map(|v| Address::try_from(v.value()))
                .transpose()
                .map_err(|e| HistoryDbError::Corrupt(e.to_string()))?;

            match stored {
                Some(existing) if existing == contract => false,
                stored => {
                    state.remove(CURSOR_KEY)?;
                    state.insert(CONTRACT_KEY, contract.as_slice())?;
                    stored.is_some()
                }
            }
        };
        if reset {
            write_txn.delete_table(HISTORY)?;
            let _ = write_txn.open_table(HISTORY)?;
        }
        write_txn.commit()?;
        Ok(reset)
    }

    /// Last block whose logs are persisted, `None` before the first scan.
    pub fn last_scanned_block(&self) -> HistoryDbResult<Option<u64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SCAN_STATE)?;
        match table.get(CURSOR_KEY)? {
            Some(v) => {
                let bytes: [u8; 8] = v
                    .value()
                    .try_into()
                    .map_err(|_| HistoryDbError::Corrupt("cursor is not 8 bytes".to_string()))?;
                Ok(Some(u64::from_be_bytes(bytes)))
            }
            None => Ok(None),
        }
    }

    /// Store the entries of one scanned range and advance the cursor to
    /// `scanned_to`, in a single commit.
    ///
    /// Re-inserting an entry at the same (block, log_index) overwrites it, so
    /// replaying a range is harmless.
    pub fn append_range(&self, entries: &[HistoryEntry], scanned_to: u64) -> HistoryDbResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut history = write_txn.open_table(HISTORY)?;
            for entry in entries {
                let json = serde_json::to_vec(entry)?;
                let key = make_key(entry.block_number, entry.log_index);
                history.insert(key.as_slice(), json.as_slice())?;
            }

            let mut state = write_txn.open_table(SCAN_STATE)?;
            state.insert(CURSOR_KEY, scanned_to.to_be_bytes().as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// All stored entries ordered by (block_number, log_index) descending.
    pub fn list_newest_first(&self) -> HistoryDbResult<Vec<HistoryEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(HISTORY)?;

        let mut entries = Vec::new();
        for row in table.iter()? {
            let (_, value) = row?;
            entries.push(serde_json::from_slice(value.value())?);
        }
        Ok(entries)
    }

    /// Drop every entry and the cursor. The contract binding is kept.
    pub fn reset(&self) -> HistoryDbResult<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(HISTORY)?;
        {
            let _ = write_txn.open_table(HISTORY)?;
            let mut state = write_txn.open_table(SCAN_STATE)?;
            state.remove(CURSOR_KEY)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (HistoryDb, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = HistoryDb::open(&dir.path().join("history.redb")).unwrap();
        (db, dir)
    }

    fn entry(block_number: u64, log_index: u64) -> HistoryEntry {
        HistoryEntry {
            tx_hash: format!("0x{:064x}", block_number * 100 + log_index),
            from: "0x1111111111111111111111111111111111111111".to_string(),
            to: "0x2222222222222222222222222222222222222222".to_string(),
            amount: "10".to_string(),
            block_number,
            log_index,
        }
    }

    #[test]
    fn empty_store_has_no_cursor() {
        let (db, _dir) = temp_db();
        assert_eq!(db.last_scanned_block().unwrap(), None);
        assert!(db.list_newest_first().unwrap().is_empty());
    }

    #[test]
    fn append_range_moves_cursor() {
        let (db, _dir) = temp_db();
        db.append_range(&[entry(3, 0)], 10).unwrap();
        assert_eq!(db.last_scanned_block().unwrap(), Some(10));

        db.append_range(&[], 25).unwrap();
        assert_eq!(db.last_scanned_block().unwrap(), Some(25));
        assert_eq!(db.list_newest_first().unwrap().len(), 1);
    }

    #[test]
    fn list_is_newest_first() {
        let (db, _dir) = temp_db();
        db.append_range(&[entry(2, 0), entry(7, 1), entry(7, 0), entry(5, 3)], 7)
            .unwrap();

        let positions: Vec<_> = db
            .list_newest_first()
            .unwrap()
            .into_iter()
            .map(|e| (e.block_number, e.log_index))
            .collect();
        assert_eq!(positions, vec![(7, 1), (7, 0), (5, 3), (2, 0)]);
    }

    #[test]
    fn replaying_a_range_does_not_duplicate() {
        let (db, _dir) = temp_db();
        db.append_range(&[entry(4, 0), entry(4, 1)], 4).unwrap();
        db.append_range(&[entry(4, 0), entry(4, 1)], 4).unwrap();
        assert_eq!(db.list_newest_first().unwrap().len(), 2);
    }

    #[test]
    fn reset_clears_entries_and_cursor() {
        let (db, _dir) = temp_db();
        db.append_range(&[entry(1, 0)], 1).unwrap();
        db.reset().unwrap();

        assert_eq!(db.last_scanned_block().unwrap(), None);
        assert!(db.list_newest_first().unwrap().is_empty());
    }

    #[test]
    fn contract_change_drops_history() {
        let (db, _dir) = temp_db();
        let first = Address::repeat_byte(0x01);
        let second = Address::repeat_byte(0x02);

        assert!(!db.ensure_contract(first).unwrap());
        db.append_range(&[entry(1, 0)], 1).unwrap();

        // same contract keeps rows
        assert!(!db.ensure_contract(first).unwrap());
        assert_eq!(db.last_scanned_block().unwrap(), Some(1));

        assert!(db.ensure_contract(second).unwrap());
        assert_eq!(db.last_scanned_block().unwrap(), None);
        assert!(db.list_newest_first().unwrap().is_empty());
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.redb");
        {
            let db = HistoryDb::open(&path).unwrap();
            db.append_range(&[entry(9, 2)], 12).unwrap();
        }
        let db = HistoryDb::open(&path).unwrap();
        assert_eq!(db.last_scanned_block().unwrap(), Some(12));
        assert_eq!(db.list_newest_first().unwrap(), vec![entry(9, 2)]);
    }

    #[test]
    fn make_key_ordering() {
        assert!(make_key(10, 0) < make_key(9, 5), "Higher blocks should sort first");
        assert!(make_key(10, 3) < make_key(10, 2), "Higher log index should sort first");
    }
}
