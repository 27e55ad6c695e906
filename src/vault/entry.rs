//! Entry and SecretKey types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier joining a metadata row to its secret-store value.
///
/// Generated once when an entry is created and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SecretKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One vault item as stored in the metadata table.
///
/// Carries no secret material; the value is fetched on demand
/// through `secret_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub description: String,
    pub secret_key: SecretKey,
}
