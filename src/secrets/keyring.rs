//! OS keyring secret store.
//!
//! Stores each secret in the operating system's credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! The service name comes from settings; the account is the entry's
//! secret key.

use tracing::debug;
use zeroize::Zeroizing;

use super::SecretStore;
use crate::errors::{Result, VaultError};
use crate::vault::SecretKey;

pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &SecretKey) -> Result<::keyring::Entry> {
        ::keyring::Entry::new(&self.service, key.as_str())
            .map_err(|e| VaultError::Store(format!("failed to create keyring entry: {e}")))
    }
}

impl SecretStore for KeyringSecretStore {
    fn set(&mut self, key: &SecretKey, value: &str) -> Result<()> {
        self.entry(key)?.set_password(value).map_err(|e| {
            VaultError::Store(format!("failed to store secret in keyring: {e}"))
        })?;
        debug!(service = %self.service, "stored secret in keyring");
        Ok(())
    }

    fn get(&self, key: &SecretKey) -> Result<Zeroizing<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Zeroizing::new(value)),
            Err(::keyring::Error::NoEntry) => Err(VaultError::NotFound(key.to_string())),
            Err(e) => Err(VaultError::Store(format!(
                "failed to read from keyring: {e}"
            ))),
        }
    }

    fn delete(&mut self, key: &SecretKey) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(::keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(VaultError::Store(format!(
                "failed to delete from keyring: {e}"
            ))),
        }
    }
}
