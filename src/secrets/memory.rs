//! In-memory secret store.

use std::collections::HashMap;

use zeroize::Zeroizing;

use super::SecretStore;
use crate::errors::{Result, VaultError};
use crate::vault::SecretKey;

/// Secret store that lives only as long as the process.
///
/// Values are wiped from memory when removed or when the store drops.
#[derive(Default)]
pub struct MemorySecretStore {
    values: HashMap<SecretKey, Zeroizing<String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, key: &SecretKey) -> bool {
        self.values.contains_key(key)
    }
}

impl SecretStore for MemorySecretStore {
    fn set(&mut self, key: &SecretKey, value: &str) -> Result<()> {
        self.values.insert(key.clone(), Zeroizing::new(value.to_string()));
        Ok(())
    }

    fn get(&self, key: &SecretKey) -> Result<Zeroizing<String>> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(key.to_string()))
    }

    fn delete(&mut self, key: &SecretKey) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}
