//! `VaultCoordinator`: sequences every operation across the metadata
//! table and the secret store.
//!
//! Ordering rules:
//! - create: insert the row first, write the secret only after the insert
//!   succeeded; if the secret write fails the row is rolled back.
//! - delete: remove the row first, purge the secret afterwards. A failed
//!   purge leaves an unreachable secret behind but the entry is gone.
//! - rename never touches the secret store; change-secret never touches
//!   the metadata table.

use std::sync::mpsc::Receiver;

use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::entry::{Entry, SecretKey};
use super::events::{EventBus, VaultEvent};
use super::keygen::{KeyGenerator, UuidKeyGenerator};
use crate::errors::{Result, VaultError};
use crate::metadata::MetadataTable;
use crate::secrets::SecretStore;

/// Owns both stores and is the only code allowed to call them together.
pub struct VaultCoordinator<M, S, G = UuidKeyGenerator> {
    metadata: M,
    secrets: S,
    keygen: G,
    events: EventBus,
}

impl<M: MetadataTable, S: SecretStore> VaultCoordinator<M, S> {
    /// Build a coordinator with random UUID secret keys.
    ///
    /// Ensures the metadata schema exists.
    pub fn new(metadata: M, secrets: S) -> Result<Self> {
        Self::with_key_generator(metadata, secrets, UuidKeyGenerator)
    }
}

impl<M: MetadataTable, S: SecretStore, G: KeyGenerator> VaultCoordinator<M, S, G> {
    pub fn with_key_generator(metadata: M, secrets: S, keygen: G) -> Result<Self> {
        metadata.ensure_schema()?;
        Ok(Self {
            metadata,
            secrets,
            keygen,
            events: EventBus::new(),
        })
    }

    /// Receive an event after every successful mutation.
    pub fn subscribe(&mut self) -> Receiver<VaultEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn list_entries(&self) -> Result<Vec<Entry>> {
        self.metadata.list()
    }

    pub fn find_entry(&self, id: i64) -> Result<Option<Entry>> {
        self.metadata.find(id)
    }

    /// Fetch the secret for `secret_key`.
    pub fn reveal_secret(&self, secret_key: &SecretKey) -> Result<Zeroizing<String>> {
        self.secrets.get(secret_key)
    }

    /// Like `reveal_secret`, but any failure becomes `placeholder`.
    pub fn reveal_or_placeholder(
        &self,
        secret_key: &SecretKey,
        placeholder: &str,
    ) -> Zeroizing<String> {
        match self.secrets.get(secret_key) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "secret unavailable, showing placeholder");
                Zeroizing::new(placeholder.to_string())
            }
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create an entry and store its secret.
    pub fn create_entry(&mut self, description: &str, secret: &str) -> Result<Entry> {
        let description = validate_description(description)?;
        validate_secret(secret)?;

        let secret_key = self.keygen.generate();
        let id = self.metadata.insert(description, &secret_key)?;

        if let Err(err) = self.secrets.set(&secret_key, secret) {
            warn!(id, error = %err, "secret write failed, rolling back metadata row");
            if let Err(rollback_err) = self.metadata.delete(id) {
                warn!(id, error = %rollback_err, "rollback failed, entry has no secret");
                return Err(VaultError::Inconsistent {
                    id,
                    source: Box::new(err),
                });
            }
            return Err(err);
        }

        debug!(id, "created entry");
        self.events.publish(VaultEvent::Created { id });

        Ok(Entry {
            id,
            description: description.to_string(),
            secret_key,
        })
    }

    /// Change an entry's description. The secret is untouched.
    pub fn rename_entry(&mut self, id: i64, new_description: &str) -> Result<()> {
        let description = validate_description(new_description)?;
        self.metadata.update_description(id, description)?;

        debug!(id, "renamed entry");
        self.events.publish(VaultEvent::Renamed { id });
        Ok(())
    }

    /// Overwrite the secret of an entry the caller already holds.
    pub fn change_secret(&mut self, entry: &Entry, new_secret: &str) -> Result<()> {
        validate_secret(new_secret)?;
        self.secrets.set(&entry.secret_key, new_secret)?;

        debug!(id = entry.id, "changed secret");
        self.events.publish(VaultEvent::SecretChanged { id: entry.id });
        Ok(())
    }

    /// The edit flow: apply a new description and/or a new secret.
    ///
    /// Rejected with `NothingToUpdate` unless the description actually
    /// differs or a secret is supplied. Both inputs are validated before
    /// either store is written.
    ///
    /// The rename is applied first. If the secret write then fails, the
    /// error is returned but the rename stays committed and its `Renamed`
    /// event has already been published.
    pub fn edit_entry(
        &mut self,
        entry: &Entry,
        new_description: Option<&str>,
        new_secret: Option<&str>,
    ) -> Result<Entry> {
        let rename = match new_description {
            Some(d) => {
                let d = validate_description(d)?;
                (d != entry.description).then_some(d)
            }
            None => None,
        };
        if let Some(secret) = new_secret {
            validate_secret(secret)?;
        }
        if rename.is_none() && new_secret.is_none() {
            return Err(VaultError::NothingToUpdate);
        }

        let mut updated = entry.clone();
        if let Some(description) = rename {
            self.rename_entry(entry.id, description)?;
            updated.description = description.to_string();
        }
        if let Some(secret) = new_secret {
            if let Err(err) = self.change_secret(entry, secret) {
                if rename.is_some() {
                    warn!(
                        id = entry.id,
                        error = %err,
                        "renamed, but the new secret was not saved"
                    );
                }
                return Err(err);
            }
        }
        Ok(updated)
    }

    /// Delete the row, then purge its secret.
    ///
    /// An id with no row is a no-op: the secret store is not touched and
    /// no event is published.
    pub fn delete_entry(&mut self, id: i64, secret_key: &SecretKey) -> Result<()> {
        if !self.metadata.delete(id)? {
            debug!(id, "no such entry, nothing deleted");
            return Ok(());
        }
        self.events.publish(VaultEvent::Deleted { id });

        if let Err(err) = self.secrets.delete(secret_key) {
            warn!(id, error = %err, "entry deleted but its secret could not be purged");
            return Err(err);
        }

        debug!(id, "deleted entry");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    pub fn secrets(&self) -> &S {
        &self.secrets
    }
}

// ----------------------------------------------------------------------
// Validation
// ----------------------------------------------------------------------

/// Trimmed, non-empty description.
fn validate_description(description: &str) -> Result<&str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(VaultError::InvalidInput("description cannot be empty".into()));
    }
    Ok(trimmed)
}

/// Secrets are stored verbatim but must contain something besides whitespace.
fn validate_secret(secret: &str) -> Result<()> {
    if secret.trim().is_empty() {
        return Err(VaultError::InvalidInput("password cannot be empty".into()));
    }
    Ok(())
}
