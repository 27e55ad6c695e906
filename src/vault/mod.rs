//! Vault module: entries and the coordinator that keeps both stores in sync.
//!
//! This module provides:
//! - `Entry` and `SecretKey` types (`entry`)
//! - Secret-key generation (`keygen`)
//! - "Entries changed" notifications (`events`)
//! - `VaultCoordinator`, the only component that talks to both stores (`coordinator`)

pub mod coordinator;
pub mod entry;
pub mod events;
pub mod keygen;

pub use coordinator::VaultCoordinator;
pub use entry::{Entry, SecretKey};
pub use events::{EventBus, VaultEvent};
pub use keygen::{KeyGenerator, UuidKeyGenerator};
