//! Binary layout of the encrypted secret file.
//!
//! ```text
//! [PVLT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][slots JSON][HMAC-SHA256: 32 bytes]
//! ```
//!
//! - **Magic** (`PVLT`): identifies a PassVault secret file.
//! - **Header JSON**: serialized `SecretFileHeader` (salt, KDF params).
//! - **Slots JSON**: serialized `Vec<SecretSlot>`, one per secret key.
//! - **HMAC-SHA256**: tag over header + slots bytes.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::crypto::Argon2Params;
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"PVLT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

const HMAC_LEN: usize = 32;

/// 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Metadata stored at the beginning of the secret file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretFileHeader {
    pub version: u8,

    /// Argon2id salt (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    pub created_at: DateTime<Utc>,

    /// KDF parameters used when the file was created, reused on open.
    pub argon2_params: Argon2Params,
}

/// One encrypted secret value, addressed by its entry's secret key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretSlot {
    pub key: String,

    /// Nonce + AES-256-GCM ciphertext (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,
}

/// A secret file as read from disk, with the original bytes kept for
/// HMAC verification.
pub struct RawSecretFile {
    pub header: SecretFileHeader,
    pub slots: Vec<SecretSlot>,
    pub header_bytes: Vec<u8>,
    pub slots_bytes: Vec<u8>,
    pub stored_hmac: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Read / write
// ---------------------------------------------------------------------------

/// Write the secret file atomically (temp file in the same directory, then rename).
pub fn write_secret_file(
    path: &Path,
    header: &SecretFileHeader,
    slots: &[SecretSlot],
    hmac_key: &[u8],
) -> Result<()> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| VaultError::Store(format!("serialize header: {e}")))?;
    let slots_bytes = serde_json::to_vec(slots)
        .map_err(|e| VaultError::Store(format!("serialize secrets: {e}")))?;

    let hmac_tag = compute_hmac(hmac_key, &header_bytes, &slots_bytes)?;

    let header_len = u32::try_from(header_bytes.len())
        .map_err(|_| VaultError::Store("header too large".into()))?;

    let mut buf =
        Vec::with_capacity(PREFIX_LEN + header_bytes.len() + slots_bytes.len() + HMAC_LEN);
    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(&header_len.to_le_bytes());
    buf.extend_from_slice(&header_bytes);
    buf.extend_from_slice(&slots_bytes);
    buf.extend_from_slice(&hmac_tag);

    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read a secret file and split it into its parts.
///
/// The caller must verify the HMAC before trusting `slots`.
pub fn read_secret_file(path: &Path) -> Result<RawSecretFile> {
    if !path.exists() {
        return Err(VaultError::StoreNotInitialized(path.to_path_buf()));
    }

    let data = fs::read(path)?;

    if data.len() < PREFIX_LEN + HMAC_LEN {
        return Err(invalid("file too small"));
    }

    if &data[0..4] != MAGIC {
        return Err(invalid("missing PVLT magic bytes"));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(invalid(&format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| invalid("bad header length"))?,
    );
    let header_len =
        usize::try_from(header_len_u32).map_err(|_| invalid("header length overflow"))?;

    let header_end = PREFIX_LEN + header_len;
    if header_end + HMAC_LEN > data.len() {
        return Err(invalid("header length exceeds file size"));
    }

    let header_bytes = data[PREFIX_LEN..header_end].to_vec();
    let slots_end = data.len() - HMAC_LEN;
    let slots_bytes = data[header_end..slots_end].to_vec();
    let stored_hmac = data[slots_end..].to_vec();

    let header: SecretFileHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| invalid(&format!("header JSON: {e}")))?;
    let slots: Vec<SecretSlot> = serde_json::from_slice(&slots_bytes)
        .map_err(|e| invalid(&format!("secrets JSON: {e}")))?;

    Ok(RawSecretFile {
        header,
        slots,
        header_bytes,
        slots_bytes,
        stored_hmac,
    })
}

fn invalid(msg: &str) -> VaultError {
    VaultError::Store(format!("invalid secret file: {msg}"))
}

// ---------------------------------------------------------------------------
// Integrity
// ---------------------------------------------------------------------------

pub fn compute_hmac(hmac_key: &[u8], header_bytes: &[u8], slots_bytes: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| VaultError::Store(format!("invalid HMAC key: {e}")))?;
    mac.update(header_bytes);
    mac.update(slots_bytes);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time HMAC check via `Mac::verify_slice`.
pub fn verify_hmac(
    hmac_key: &[u8],
    header_bytes: &[u8],
    slots_bytes: &[u8],
    expected_hmac: &[u8],
) -> Result<()> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| VaultError::Store(format!("invalid HMAC key: {e}")))?;
    mac.update(header_bytes);
    mac.update(slots_bytes);
    mac.verify_slice(expected_hmac).map_err(|_| {
        VaultError::Store("wrong master password or secret file has been tampered with".into())
    })
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
