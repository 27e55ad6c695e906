//! Integration tests for the vault coordinator.

use std::cell::Cell;
use std::collections::HashSet;

use passvault::crypto::kdf::MIN_MEMORY_KIB;
use passvault::crypto::Argon2Params;
use passvault::errors::{Result, VaultError};
use passvault::metadata::{MetadataTable, SqliteMetadataTable};
use passvault::secrets::{FileSecretStore, MemorySecretStore, SecretStore};
use passvault::vault::{Entry, KeyGenerator, SecretKey, VaultCoordinator, VaultEvent};
use tempfile::TempDir;
use zeroize::Zeroizing;

type MemoryVault = VaultCoordinator<SqliteMetadataTable, MemorySecretStore>;

fn memory_vault() -> MemoryVault {
    VaultCoordinator::new(
        SqliteMetadataTable::open_in_memory().unwrap(),
        MemorySecretStore::new(),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Secret store that can be told to fail writes or deletes.
#[derive(Default)]
struct FlakySecretStore {
    inner: MemorySecretStore,
    fail_set: bool,
    fail_delete: bool,
    /// Writes that succeed before every later write fails.
    sets_before_failure: Option<usize>,
}

impl SecretStore for FlakySecretStore {
    fn set(&mut self, key: &SecretKey, value: &str) -> Result<()> {
        if self.fail_set {
            return Err(VaultError::Store("keystore locked".into()));
        }
        if let Some(remaining) = self.sets_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(VaultError::Store("keystore locked".into()));
            }
            *remaining -= 1;
        }
        self.inner.set(key, value)
    }

    fn get(&self, key: &SecretKey) -> Result<Zeroizing<String>> {
        self.inner.get(key)
    }

    fn delete(&mut self, key: &SecretKey) -> Result<()> {
        if self.fail_delete {
            return Err(VaultError::Store("keystore locked".into()));
        }
        self.inner.delete(key)
    }
}

/// Metadata table that can be told to fail inserts or deletes.
struct FlakyMetadata {
    inner: SqliteMetadataTable,
    fail_insert: bool,
    fail_delete: bool,
}

impl FlakyMetadata {
    fn new() -> Self {
        Self {
            inner: SqliteMetadataTable::open_in_memory().unwrap(),
            fail_insert: false,
            fail_delete: false,
        }
    }
}

impl MetadataTable for FlakyMetadata {
    fn ensure_schema(&self) -> Result<()> {
        self.inner.ensure_schema()
    }

    fn list(&self) -> Result<Vec<Entry>> {
        self.inner.list()
    }

    fn find(&self, id: i64) -> Result<Option<Entry>> {
        self.inner.find(id)
    }

    fn insert(&mut self, description: &str, secret_key: &SecretKey) -> Result<i64> {
        if self.fail_insert {
            return Err(VaultError::Storage("table unavailable".into()));
        }
        self.inner.insert(description, secret_key)
    }

    fn update_description(&mut self, id: i64, description: &str) -> Result<()> {
        self.inner.update_description(id, description)
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        if self.fail_delete {
            return Err(VaultError::Storage("table unavailable".into()));
        }
        self.inner.delete(id)
    }
}

/// Deterministic keys: key-1, key-2, ...
#[derive(Default)]
struct SequentialKeys {
    next: Cell<u32>,
}

impl KeyGenerator for SequentialKeys {
    fn generate(&self) -> SecretKey {
        let n = self.next.get() + 1;
        self.next.set(n);
        SecretKey::from(format!("key-{n}"))
    }
}

// ---------------------------------------------------------------------------
// Create / list / reveal
// ---------------------------------------------------------------------------

#[test]
fn create_then_list_and_reveal() {
    let mut vault = memory_vault();

    let entry = vault.create_entry("Email", "p@ss1").unwrap();

    let entries = vault.list_entries().unwrap();
    assert_eq!(entries, vec![entry.clone()]);
    assert_eq!(vault.reveal_secret(&entry.secret_key).unwrap().as_str(), "p@ss1");
}

#[test]
fn each_create_adds_exactly_one_entry() {
    let mut vault = memory_vault();
    vault.create_entry("Email", "p@ss1").unwrap();
    vault.create_entry("Email", "other").unwrap();

    let entries = vault.list_entries().unwrap();
    assert_eq!(entries.len(), 2, "descriptions need not be unique");
    assert_ne!(entries[0].secret_key, entries[1].secret_key);
}

#[test]
fn secret_keys_are_never_reused() {
    let mut vault = memory_vault();
    let mut seen = HashSet::new();

    for i in 0..20 {
        let entry = vault.create_entry(&format!("item {i}"), "pw").unwrap();
        assert!(seen.insert(entry.secret_key.clone()));
        if i % 2 == 0 {
            vault.delete_entry(entry.id, &entry.secret_key).unwrap();
        }
    }
}

#[test]
fn custom_key_generator_is_used() {
    let mut vault = VaultCoordinator::with_key_generator(
        SqliteMetadataTable::open_in_memory().unwrap(),
        MemorySecretStore::new(),
        SequentialKeys::default(),
    )
    .unwrap();

    let a = vault.create_entry("A", "1").unwrap();
    let b = vault.create_entry("B", "2").unwrap();
    assert_eq!(a.secret_key.as_str(), "key-1");
    assert_eq!(b.secret_key.as_str(), "key-2");
}

// ---------------------------------------------------------------------------
// Rename / change secret / edit
// ---------------------------------------------------------------------------

#[test]
fn rename_keeps_secret_key_and_value() {
    let mut vault = memory_vault();
    let entry = vault.create_entry("Email", "p@ss1").unwrap();

    vault.rename_entry(entry.id, "Email Work").unwrap();

    let renamed = vault.find_entry(entry.id).unwrap().unwrap();
    assert_eq!(renamed.description, "Email Work");
    assert_eq!(renamed.secret_key, entry.secret_key);
    assert_eq!(vault.reveal_secret(&entry.secret_key).unwrap().as_str(), "p@ss1");
}

#[test]
fn rename_missing_entry_is_reported() {
    let mut vault = memory_vault();
    assert!(matches!(
        vault.rename_entry(99, "Ghost"),
        Err(VaultError::EntryNotFound(99))
    ));
}

#[test]
fn change_secret_overwrites_in_place() {
    let mut vault = memory_vault();
    let entry = vault.create_entry("Email", "p@ss1").unwrap();

    vault.change_secret(&entry, "p@ss2").unwrap();

    assert_eq!(vault.list_entries().unwrap(), vec![entry.clone()]);
    assert_eq!(vault.secrets().len(), 1);
    assert_eq!(vault.reveal_secret(&entry.secret_key).unwrap().as_str(), "p@ss2");
}

#[test]
fn edit_applies_both_changes() {
    let mut vault = memory_vault();
    let entry = vault.create_entry("Email", "p@ss1").unwrap();

    let updated = vault
        .edit_entry(&entry, Some("Email Work"), Some("p@ss2"))
        .unwrap();

    assert_eq!(updated.description, "Email Work");
    assert_eq!(updated.secret_key, entry.secret_key);
    assert_eq!(vault.find_entry(entry.id).unwrap().unwrap(), updated);
    assert_eq!(vault.reveal_secret(&entry.secret_key).unwrap().as_str(), "p@ss2");
}

#[test]
fn edit_with_unchanged_description_but_new_secret_is_allowed() {
    let mut vault = memory_vault();
    let entry = vault.create_entry("Email", "p@ss1").unwrap();
    let events = vault.subscribe();

    vault.edit_entry(&entry, Some("Email"), Some("p@ss2")).unwrap();

    let received: Vec<_> = events.try_iter().collect();
    assert_eq!(received, vec![VaultEvent::SecretChanged { id: entry.id }]);
}

#[test]
fn secret_failure_during_edit_keeps_the_rename() {
    let store = FlakySecretStore {
        sets_before_failure: Some(1),
        ..FlakySecretStore::default()
    };
    let mut vault =
        VaultCoordinator::new(SqliteMetadataTable::open_in_memory().unwrap(), store).unwrap();
    let entry = vault.create_entry("Email", "p@ss1").unwrap();
    let events = vault.subscribe();

    let result = vault.edit_entry(&entry, Some("Email Work"), Some("p@ss2"));

    assert!(matches!(result, Err(VaultError::Store(_))));
    assert_eq!(vault.find_entry(entry.id).unwrap().unwrap().description, "Email Work");
    assert_eq!(vault.reveal_secret(&entry.secret_key).unwrap().as_str(), "p@ss1");
    assert_eq!(
        events.try_iter().collect::<Vec<_>>(),
        vec![VaultEvent::Renamed { id: entry.id }]
    );
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_removes_row_and_secret() {
    let mut vault = memory_vault();
    let keep = vault.create_entry("Bank", "1234").unwrap();
    let gone = vault.create_entry("Email", "p@ss1").unwrap();

    vault.delete_entry(gone.id, &gone.secret_key).unwrap();

    assert_eq!(vault.list_entries().unwrap(), vec![keep]);
    assert!(matches!(
        vault.reveal_secret(&gone.secret_key),
        Err(VaultError::NotFound(_))
    ));
}

#[test]
fn deleting_unknown_id_leaves_other_secrets_alone() {
    let mut vault = memory_vault();
    let keep = vault.create_entry("Bank", "1234").unwrap();
    let events = vault.subscribe();

    vault.delete_entry(keep.id + 100, &keep.secret_key).unwrap();

    assert!(events.try_recv().is_err(), "nothing was deleted");
    assert_eq!(vault.list_entries().unwrap(), vec![keep.clone()]);
    assert_eq!(vault.reveal_secret(&keep.secret_key).unwrap().as_str(), "1234");
}

#[test]
fn failed_metadata_delete_preserves_secret() {
    let mut metadata = FlakyMetadata::new();
    metadata.fail_delete = true;
    let mut vault = VaultCoordinator::new(metadata, MemorySecretStore::new()).unwrap();
    let entry = vault.create_entry("Email", "p@ss1").unwrap();

    let result = vault.delete_entry(entry.id, &entry.secret_key);

    assert!(matches!(result, Err(VaultError::Storage(_))));
    assert_eq!(vault.list_entries().unwrap().len(), 1);
    assert_eq!(vault.reveal_secret(&entry.secret_key).unwrap().as_str(), "p@ss1");
}

#[test]
fn failed_secret_purge_still_deletes_entry() {
    let store = FlakySecretStore {
        fail_delete: true,
        ..FlakySecretStore::default()
    };
    let mut vault =
        VaultCoordinator::new(SqliteMetadataTable::open_in_memory().unwrap(), store).unwrap();
    let entry = vault.create_entry("Email", "p@ss1").unwrap();
    let events = vault.subscribe();

    let result = vault.delete_entry(entry.id, &entry.secret_key);

    assert!(matches!(result, Err(VaultError::Store(_))));
    assert!(vault.list_entries().unwrap().is_empty(), "metadata decides existence");
    assert_eq!(
        events.try_iter().collect::<Vec<_>>(),
        vec![VaultEvent::Deleted { id: entry.id }]
    );
    // The orphan is still in the store under an unreachable key.
    assert!(vault.secrets().inner.contains(&entry.secret_key));
}

// ---------------------------------------------------------------------------
// Two-store consistency on create
// ---------------------------------------------------------------------------

#[test]
fn failed_insert_never_writes_secret() {
    let mut metadata = FlakyMetadata::new();
    metadata.fail_insert = true;
    let mut vault = VaultCoordinator::new(metadata, MemorySecretStore::new()).unwrap();

    let result = vault.create_entry("Email", "p@ss1");

    assert!(matches!(result, Err(VaultError::Storage(_))));
    assert!(vault.secrets().is_empty());
}

#[test]
fn failed_secret_write_rolls_back_row() {
    let store = FlakySecretStore {
        fail_set: true,
        ..FlakySecretStore::default()
    };
    let mut vault =
        VaultCoordinator::new(SqliteMetadataTable::open_in_memory().unwrap(), store).unwrap();
    let events = vault.subscribe();

    let result = vault.create_entry("Email", "p@ss1");

    assert!(matches!(result, Err(VaultError::Store(_))));
    assert!(vault.list_entries().unwrap().is_empty(), "no dangling entry");
    assert!(events.try_recv().is_err(), "nothing changed");
}

#[test]
fn failed_rollback_is_reported_as_inconsistent() {
    let mut metadata = FlakyMetadata::new();
    metadata.fail_delete = true;
    let store = FlakySecretStore {
        fail_set: true,
        ..FlakySecretStore::default()
    };
    let mut vault = VaultCoordinator::new(metadata, store).unwrap();

    let result = vault.create_entry("Email", "p@ss1");

    match result {
        Err(VaultError::Inconsistent { id, source }) => {
            assert!(matches!(*source, VaultError::Store(_)));
            assert_eq!(vault.list_entries().unwrap()[0].id, id);
        }
        other => panic!("expected Inconsistent, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[test]
fn subscribers_see_one_event_per_mutation() {
    let mut vault = memory_vault();
    let events = vault.subscribe();

    let entry = vault.create_entry("Email", "p@ss1").unwrap();
    vault.rename_entry(entry.id, "Email Work").unwrap();
    vault.change_secret(&entry, "p@ss2").unwrap();
    vault.delete_entry(entry.id, &entry.secret_key).unwrap();

    let id = entry.id;
    assert_eq!(
        events.try_iter().collect::<Vec<_>>(),
        vec![
            VaultEvent::Created { id },
            VaultEvent::Renamed { id },
            VaultEvent::SecretChanged { id },
            VaultEvent::Deleted { id },
        ]
    );
}

#[test]
fn failed_operations_publish_nothing() {
    let mut vault = memory_vault();
    let events = vault.subscribe();

    let _ = vault.create_entry("", "p@ss1");
    let _ = vault.rename_entry(42, "Ghost");

    assert!(events.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[test]
fn reopening_with_existing_rows_keeps_them() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("vault.db");

    let mut vault =
        VaultCoordinator::new(SqliteMetadataTable::open(&db).unwrap(), MemorySecretStore::new())
            .unwrap();
    vault.create_entry("Email", "p@ss1").unwrap();
    drop(vault);

    let vault =
        VaultCoordinator::new(SqliteMetadataTable::open(&db).unwrap(), MemorySecretStore::new())
            .unwrap();
    vault.metadata().ensure_schema().unwrap();
    assert_eq!(vault.list_entries().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// End-to-end scenario on durable stores
// ---------------------------------------------------------------------------

#[test]
fn email_scenario_on_sqlite_and_encrypted_file() {
    let dir = TempDir::new().unwrap();
    let params = Argon2Params {
        memory_kib: MIN_MEMORY_KIB,
        iterations: 1,
        parallelism: 1,
    };
    let metadata = SqliteMetadataTable::open(&dir.path().join("vault.db")).unwrap();
    let secrets =
        FileSecretStore::create(&dir.path().join("secrets.vault"), b"master-pw", &params).unwrap();
    let mut vault = VaultCoordinator::new(metadata, secrets).unwrap();

    let entry = vault.create_entry("Email", "p@ss1").unwrap();

    let listed = vault.list_entries().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].description, "Email");
    assert_eq!(vault.reveal_secret(&entry.secret_key).unwrap().as_str(), "p@ss1");

    vault.rename_entry(entry.id, "Email Work").unwrap();
    assert_eq!(vault.list_entries().unwrap()[0].description, "Email Work");

    vault.delete_entry(entry.id, &entry.secret_key).unwrap();
    assert!(vault.list_entries().unwrap().is_empty());
    assert!(matches!(
        vault.reveal_secret(&entry.secret_key),
        Err(VaultError::NotFound(_))
    ));
}
