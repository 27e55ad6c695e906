//! Metadata table: the durable, queryable record of vault entries.
//!
//! Holds only non-secret attributes (id, description, secret key). It is
//! the source of truth for whether an entry exists.

pub mod sqlite;

pub use sqlite::SqliteMetadataTable;

use crate::errors::Result;
use crate::vault::{Entry, SecretKey};

/// Contract for the relational side of the vault.
///
/// Implementations never touch the secret store.
pub trait MetadataTable {
    /// Create the entry table if it does not exist. Safe to call on every start.
    fn ensure_schema(&self) -> Result<()>;

    /// Snapshot of every entry in storage order.
    fn list(&self) -> Result<Vec<Entry>>;

    /// Look up a single entry by id.
    fn find(&self, id: i64) -> Result<Option<Entry>>;

    /// Insert a new row and return its assigned id.
    fn insert(&mut self, description: &str, secret_key: &SecretKey) -> Result<i64>;

    /// Change the description of an existing row.
    ///
    /// Returns `EntryNotFound` when no row has this id.
    fn update_description(&mut self, id: i64, description: &str) -> Result<()>;

    /// Remove a row. Absent ids are a no-op.
    ///
    /// Returns whether a row was actually removed.
    fn delete(&mut self, id: i64) -> Result<bool>;
}
