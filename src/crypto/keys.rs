//! Sub-key derivation using HKDF-SHA256.
//!
//! From the master key we derive:
//! - a per-entry encryption key bound to the entry's secret key, and
//! - a dedicated HMAC key for the secret file's integrity trailer.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

const KEY_LEN: usize = 32;

/// Derive the encryption key for one secret-store slot.
///
/// `info` is `"passvault-entry:<secret_key>"`, so a ciphertext copied
/// into another slot will not decrypt.
pub fn derive_entry_key(master_key: &[u8], secret_key: &str) -> Result<[u8; KEY_LEN]> {
    let info = format!("passvault-entry:{secret_key}");
    hkdf_derive(master_key, info.as_bytes())
}

/// Derive the HMAC key used to authenticate the whole secret file.
pub fn derive_hmac_key(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, b"passvault-hmac-key")
}

// The master key already comes out of Argon2id, so the extract step is skipped.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| VaultError::Store(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte master key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub fn derive_entry_key(&self, secret_key: &str) -> Result<[u8; KEY_LEN]> {
        derive_entry_key(&self.bytes, secret_key)
    }

    pub fn derive_hmac_key(&self) -> Result<[u8; KEY_LEN]> {
        derive_hmac_key(&self.bytes)
    }
}
