//! # RelayDB - Transaction Record Store
//!
//! Persistence for payment attempts, built on sled's embedded key-value
//! store.
//!
//! ## Tree Layout
//!
//! | Tree           | Key                    | Value                       |
//! |----------------|------------------------|-----------------------------|
//! | `transactions` | `internal_id` (UTF-8)  | `json(TransactionRecord)`   |
//!
//! Records hold arbitrary JSON (bank responses, checkout metadata), so they
//! are stored as JSON rather than bincode.
//!
//! ## Immutability
//!
//! Records are insert-only. [`RelayDB::insert_record`] uses compare-and-swap
//! against an absent key, so a second write under the same id fails instead
//! of overwriting. There is no update or delete.

use sled::{Db, Tree};
use std::path::Path;

use super::record::TransactionRecord;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("record already exists: {0}")]
    Duplicate(String),
}

pub type DbResult<T> = Result<T, DbError>;

// ---------------------------------------------------------------------------
// RelayDB
// ---------------------------------------------------------------------------

/// Persistent store for [`TransactionRecord`]s.
///
/// sled is thread-safe; share a `RelayDB` across handlers with `Arc`.
#[derive(Debug, Clone)]
pub struct RelayDB {
    db: Db,
    transactions: Tree,
}

impl RelayDB {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory database removed on drop. For tests.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let transactions = db.open_tree("transactions")?;
        Ok(Self { db, transactions })
    }

    /// Persist a new record. Fails with [`DbError::Duplicate`] if the id is
    /// already taken.
    pub fn insert_record(&self, record: &TransactionRecord) -> DbResult<()> {
        let bytes =
            serde_json::to_vec(record).map_err(|e| DbError::Serialization(e.to_string()))?;

        self.transactions
            .compare_and_swap(
                record.internal_id.as_bytes(),
                None::<&[u8]>,
                Some(bytes),
            )?
            .map_err(|_| DbError::Duplicate(record.internal_id.clone()))?;

        self.db.flush()?;
        Ok(())
    }

    /// Fetch a record by id. `None` if no such record exists.
    pub fn get_record(&self, id: &str) -> DbResult<Option<TransactionRecord>> {
        match self.transactions.get(id.as_bytes())? {
            Some(bytes) => {
                let record = serde_json::from_slice(&bytes)
                    .map_err(|e| DbError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.transactions.len()
    }

    /// Block until all pending writes are durable.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
