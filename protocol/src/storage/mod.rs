//! # Storage Module
//!
//! Durable, insert-only records of every payment attempt that got an answer
//! from the bank.
//!
//! ```text
//! record.rs - TransactionRecord and RecordStatus
//! db.rs     - sled persistence with compare-and-swap inserts
//! ```
//!
//! Transport failures never produce a record: without a bank response there
//! is nothing to audit.

pub mod db;
pub mod record;

pub use db::{DbError, DbResult, RelayDB};
pub use record::{RecordStatus, TransactionRecord};
