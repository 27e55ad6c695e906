use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{Result, VaultError};

/// Which `SecretStore` implementation holds secret values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// Encrypted `secrets.vault` file next to the metadata database.
    File,
    /// OS credential store (requires the `keyring-store` feature).
    Keyring,
    /// Process memory only; everything is lost on exit.
    Memory,
}

impl fmt::Display for SecretBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecretBackend::File => "file",
            SecretBackend::Keyring => "keyring",
            SecretBackend::Memory => "memory",
        };
        f.write_str(name)
    }
}

impl FromStr for SecretBackend {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "file" => Ok(SecretBackend::File),
            "keyring" => Ok(SecretBackend::Keyring),
            "memory" => Ok(SecretBackend::Memory),
            other => Err(VaultError::Config(format!(
                "unknown secret backend '{other}' — supported: file, keyring, memory"
            ))),
        }
    }
}

/// Project-level configuration, loaded from `.passvault.toml`.
///
/// Every field has a default so PassVault works without any config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the database and secret file.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// File name of the SQLite metadata database inside `data_dir`.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Where secret values live.
    #[serde(default = "default_secret_backend")]
    pub secret_backend: SecretBackend,

    /// Service name used for OS keyring entries.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Text shown by `reveal` when a secret cannot be retrieved.
    #[serde(default = "default_reveal_placeholder")]
    pub reveal_placeholder: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_dir() -> String {
    ".passvault".to_string()
}

fn default_database_file() -> String {
    "vault.db".to_string()
}

fn default_secret_backend() -> SecretBackend {
    SecretBackend::File
}

fn default_keyring_service() -> String {
    "passvault".to_string()
}

fn default_reveal_placeholder() -> String {
    "Unable to retrieve password".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            secret_backend: default_secret_backend(),
            keyring_service: default_keyring_service(),
            reveal_placeholder: default_reveal_placeholder(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".passvault.toml";

    /// File name of the encrypted secret store inside `data_dir`.
    pub const SECRETS_FILE: &'static str = "secrets.vault";

    /// Load settings from `<project_dir>/.passvault.toml`.
    ///
    /// A missing file yields defaults; an unparsable one is an error.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// `project_dir/.passvault`
    pub fn data_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.data_dir)
    }

    /// `project_dir/.passvault/vault.db`
    pub fn database_path(&self, project_dir: &Path) -> PathBuf {
        self.data_path(project_dir).join(&self.database_file)
    }

    /// `project_dir/.passvault/secrets.vault`
    pub fn secrets_path(&self, project_dir: &Path) -> PathBuf {
        self.data_path(project_dir).join(Self::SECRETS_FILE)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
