//! SQLite-backed metadata table.
//!
//! One table, `entries`, with an `AUTOINCREMENT` primary key so ids are
//! never handed out twice, even after the highest row is deleted.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::MetadataTable;
use crate::errors::{Result, VaultError};
use crate::vault::{Entry, SecretKey};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    description TEXT,
    key         TEXT NOT NULL UNIQUE
);";

/// Metadata table stored in a local SQLite database.
pub struct SqliteMetadataTable {
    conn: Connection,
}

impl SqliteMetadataTable {
    /// Open (or create) the database at `path` and ensure the schema.
    ///
    /// Parent directories are created as needed. On Unix the database
    /// file is restricted to the owner.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| VaultError::Storage(format!("open {}: {e}", path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        let table = Self { conn };
        table.ensure_schema()?;
        Ok(table)
    }

    /// Open a throwaway in-memory database (tests and the memory backend).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let table = Self { conn };
        table.ensure_schema()?;
        Ok(table)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    let description: Option<String> = row.get(1)?;
    let key: String = row.get(2)?;
    Ok(Entry {
        id: row.get(0)?,
        description: description.unwrap_or_default(),
        secret_key: SecretKey::from(key),
    })
}

impl MetadataTable for SqliteMetadataTable {
    fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(|e| VaultError::Storage(format!("create schema: {e}")))
    }

    fn list(&self) -> Result<Vec<Entry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, description, key FROM entries ORDER BY id")?;

        let rows = stmt.query_map([], row_to_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn find(&self, id: i64) -> Result<Option<Entry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, description, key FROM entries WHERE id = ?1",
                params![id],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn insert(&mut self, description: &str, secret_key: &SecretKey) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO entries (description, key) VALUES (?1, ?2)",
                params![description, secret_key.as_str()],
            )
            .map_err(|e| VaultError::Storage(format!("insert entry: {e}")))?;

        let id = self.conn.last_insert_rowid();
        debug!(id, "inserted metadata row");
        Ok(id)
    }

    fn update_description(&mut self, id: i64, description: &str) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE entries SET description = ?1 WHERE id = ?2",
                params![description, id],
            )
            .map_err(|e| VaultError::Storage(format!("update entry {id}: {e}")))?;

        if changed == 0 {
            return Err(VaultError::EntryNotFound(id));
        }
        Ok(())
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])
            .map_err(|e| VaultError::Storage(format!("delete entry {id}: {e}")))?;
        debug!(id, removed, "deleted metadata row");
        Ok(removed > 0)
    }
}
