//! Secret-key generation.

use uuid::Uuid;

use super::entry::SecretKey;

/// Source of fresh secret keys.
///
/// Every call must return a value never returned before for the
/// lifetime of the store.
pub trait KeyGenerator {
    fn generate(&self) -> SecretKey;
}

/// Random UUID v4 keys (122 random bits, collisions are negligible).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate(&self) -> SecretKey {
        SecretKey::from(Uuid::new_v4().hyphenated().to_string())
    }
}
