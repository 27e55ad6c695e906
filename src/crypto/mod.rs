//! Cryptographic primitives behind the file-backed secret store.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id master-password key derivation (`kdf`)
//! - HKDF-based per-entry key and HMAC key derivation (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

pub use encryption::{decrypt, encrypt};
pub use kdf::{derive_master_key, derive_master_key_with_params, generate_salt, Argon2Params};
pub use keys::{derive_entry_key, derive_hmac_key, MasterKey};
