//! Secret store: isolated key→string storage for secret values.
//!
//! Secret values never enter the metadata table. Implementations:
//! - `MemorySecretStore`: process memory only (`memory`)
//! - `FileSecretStore`: encrypted, HMAC-authenticated file (`file`, `format`)
//! - `KeyringSecretStore`: OS credential store (`keyring`, feature `keyring-store`)

pub mod file;
pub mod format;
pub mod memory;

#[cfg(feature = "keyring-store")]
pub mod keyring;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;

#[cfg(feature = "keyring-store")]
pub use self::keyring::KeyringSecretStore;

use zeroize::Zeroizing;

use crate::errors::Result;
use crate::vault::SecretKey;

/// Contract for the secret side of the vault.
pub trait SecretStore {
    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &SecretKey, value: &str) -> Result<()>;

    /// Fetch the value under `key`.
    ///
    /// Fails with `NotFound` when nothing is stored there.
    fn get(&self, key: &SecretKey) -> Result<Zeroizing<String>>;

    /// Remove the value under `key`. Absent keys are a no-op.
    fn delete(&mut self, key: &SecretKey) -> Result<()>;
}

impl<T: SecretStore + ?Sized> SecretStore for Box<T> {
    fn set(&mut self, key: &SecretKey, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn get(&self, key: &SecretKey) -> Result<Zeroizing<String>> {
        (**self).get(key)
    }

    fn delete(&mut self, key: &SecretKey) -> Result<()> {
        (**self).delete(key)
    }
}
