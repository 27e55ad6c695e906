//! Encrypted, file-backed secret store.
//!
//! `FileSecretStore` keeps one AES-256-GCM ciphertext per secret key in
//! `secrets.vault`. The master key comes from the master password via
//! Argon2id; each slot is encrypted with its own HKDF sub-key. Every
//! mutation is written to disk before the call returns.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use super::format::{self, SecretFileHeader, SecretSlot, CURRENT_VERSION};
use super::SecretStore;
use crate::crypto::keys::MasterKey;
use crate::crypto::{decrypt, derive_master_key_with_params, encrypt, generate_salt, Argon2Params};
use crate::errors::{Result, VaultError};
use crate::vault::SecretKey;

pub struct FileSecretStore {
    path: PathBuf,
    header: SecretFileHeader,
    /// secret key -> nonce + ciphertext
    slots: HashMap<String, Vec<u8>>,
    master_key: MasterKey,
}

impl FileSecretStore {
    /// Create a new, empty secret file at `path`.
    ///
    /// Fails if the file already exists.
    pub fn create(path: &Path, password: &[u8], params: &Argon2Params) -> Result<Self> {
        if path.exists() {
            return Err(VaultError::Store(format!(
                "secret file already exists at {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let salt = generate_salt();
        let mut master_bytes = derive_master_key_with_params(password, &salt, params)?;
        let master_key = MasterKey::new(master_bytes);
        master_bytes.zeroize();

        let header = SecretFileHeader {
            version: CURRENT_VERSION,
            salt: salt.to_vec(),
            created_at: Utc::now(),
            argon2_params: *params,
        };

        let store = Self {
            path: path.to_path_buf(),
            header,
            slots: HashMap::new(),
            master_key,
        };
        store.save()?;
        debug!(path = %path.display(), "created secret file");
        Ok(store)
    }

    /// Open an existing secret file, verifying its HMAC with the key
    /// derived from `password`.
    pub fn open(path: &Path, password: &[u8]) -> Result<Self> {
        let raw = format::read_secret_file(path)?;

        let mut master_bytes =
            derive_master_key_with_params(password, &raw.header.salt, &raw.header.argon2_params)?;
        let master_key = MasterKey::new(master_bytes);
        master_bytes.zeroize();

        let mut hmac_key = master_key.derive_hmac_key()?;
        let verified = format::verify_hmac(
            &hmac_key,
            &raw.header_bytes,
            &raw.slots_bytes,
            &raw.stored_hmac,
        );
        hmac_key.zeroize();
        verified?;

        let slots = raw
            .slots
            .into_iter()
            .map(|s| (s.key, s.ciphertext))
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            header: raw.header,
            slots,
            master_key,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of secrets currently stored.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn save(&self) -> Result<()> {
        let mut slots: Vec<SecretSlot> = self
            .slots
            .iter()
            .map(|(key, ciphertext)| SecretSlot {
                key: key.clone(),
                ciphertext: ciphertext.clone(),
            })
            .collect();
        slots.sort_by(|a, b| a.key.cmp(&b.key));

        let mut hmac_key = self.master_key.derive_hmac_key()?;
        let written = format::write_secret_file(&self.path, &self.header, &slots, &hmac_key);
        hmac_key.zeroize();
        written
    }
}

impl SecretStore for FileSecretStore {
    fn set(&mut self, key: &SecretKey, value: &str) -> Result<()> {
        let mut entry_key = self.master_key.derive_entry_key(key.as_str())?;
        let ciphertext = encrypt(&entry_key, value.as_bytes());
        entry_key.zeroize();

        let previous = self.slots.insert(key.to_string(), ciphertext?);
        if let Err(e) = self.save() {
            // Keep memory in step with disk.
            match previous {
                Some(old) => self.slots.insert(key.to_string(), old),
                None => self.slots.remove(key.as_str()),
            };
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, key: &SecretKey) -> Result<Zeroizing<String>> {
        let ciphertext = self
            .slots
            .get(key.as_str())
            .ok_or_else(|| VaultError::NotFound(key.to_string()))?;

        let mut entry_key = self.master_key.derive_entry_key(key.as_str())?;
        let plaintext = decrypt(&entry_key, ciphertext);
        entry_key.zeroize();

        String::from_utf8(plaintext?)
            .map(Zeroizing::new)
            .map_err(|e| {
                let mut bad_bytes = e.into_bytes();
                bad_bytes.zeroize();
                VaultError::Store("secret value is not valid UTF-8".into())
            })
    }

    fn delete(&mut self, key: &SecretKey) -> Result<()> {
        let Some(old) = self.slots.remove(key.as_str()) else {
            return Ok(());
        };
        if let Err(e) = self.save() {
            self.slots.insert(key.to_string(), old);
            return Err(e);
        }
        Ok(())
    }
}
