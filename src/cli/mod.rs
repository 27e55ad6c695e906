//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::{SecretBackend, Settings};
use crate::errors::{Result, VaultError};
use crate::metadata::SqliteMetadataTable;
use crate::secrets::{FileSecretStore, MemorySecretStore, SecretStore};
use crate::vault::{Entry, VaultCoordinator};

/// Minimum master password length for the file backend.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV: &str = "PASSVAULT_PASSWORD";

/// The coordinator as wired up by the CLI.
pub type Vault = VaultCoordinator<SqliteMetadataTable, Box<dyn SecretStore>>;

/// PassVault CLI: local password vault.
#[derive(Parser)]
#[command(name = "passvault", about = "Local password vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default from .passvault.toml, else .passvault)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Secret backend: file, keyring, or memory
    #[arg(long, global = true, env = "PASSVAULT_BACKEND")]
    pub backend: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create the vault database and secret store
    Init,

    /// List saved passwords
    List,

    /// Save a new password
    New {
        /// What is this password for? (omit for interactive prompt)
        description: Option<String>,
    },

    /// Change a password's description and/or value
    Edit {
        /// Entry id (see `passvault list`)
        id: i64,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// Prompt for a new password value
        #[arg(short, long)]
        password: bool,
    },

    /// Delete a saved password
    Delete {
        /// Entry id
        id: i64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show a saved password
    Reveal {
        /// Entry id
        id: i64,
        /// Copy to the clipboard instead of printing
        #[arg(short, long)]
        copy: bool,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `.passvault.toml` from the current directory and apply CLI overrides.
pub fn load_settings(cli: &Cli) -> Result<(PathBuf, Settings)> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;

    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(backend) = &cli.backend {
        settings.secret_backend = backend.parse()?;
    }

    Ok((cwd, settings))
}

/// Open just the metadata table (creating it if needed).
pub fn open_metadata(cli: &Cli) -> Result<SqliteMetadataTable> {
    let (cwd, settings) = load_settings(cli)?;
    open_metadata_table(&settings, &cwd)
}

/// The memory backend keeps rows in memory too, so no entry outlives its secret.
fn open_metadata_table(settings: &Settings, project_dir: &Path) -> Result<SqliteMetadataTable> {
    match settings.secret_backend {
        SecretBackend::Memory => SqliteMetadataTable::open_in_memory(),
        SecretBackend::File | SecretBackend::Keyring => {
            SqliteMetadataTable::open(&settings.database_path(project_dir))
        }
    }
}

/// Open the metadata table and the configured secret store.
///
/// With `create` set, a missing encrypted secret file is created
/// (prompting for a new master password); otherwise it is an error.
pub fn open_vault(cli: &Cli, create: bool) -> Result<(Settings, Vault)> {
    let (cwd, settings) = load_settings(cli)?;

    let metadata = open_metadata_table(&settings, &cwd)?;
    let secrets = open_secret_store(&settings, &cwd, create)?;
    let vault = VaultCoordinator::new(metadata, secrets)?;

    Ok((settings, vault))
}

fn open_secret_store(
    settings: &Settings,
    project_dir: &Path,
    create: bool,
) -> Result<Box<dyn SecretStore>> {
    match settings.secret_backend {
        SecretBackend::File => {
            let path = settings.secrets_path(project_dir);
            if path.exists() {
                let password = prompt_password()?;
                Ok(Box::new(FileSecretStore::open(&path, password.as_bytes())?))
            } else if create {
                let password = prompt_new_password()?;
                let store =
                    FileSecretStore::create(&path, password.as_bytes(), &settings.argon2_params())?;
                Ok(Box::new(store))
            } else {
                Err(VaultError::StoreNotInitialized(path))
            }
        }
        SecretBackend::Keyring => open_keyring_store(settings),
        SecretBackend::Memory => {
            output::warning("Using the in-memory backend: nothing is saved after this command exits.");
            Ok(Box::new(MemorySecretStore::new()))
        }
    }
}

#[cfg(feature = "keyring-store")]
fn open_keyring_store(settings: &Settings) -> Result<Box<dyn SecretStore>> {
    Ok(Box::new(crate::secrets::KeyringSecretStore::new(
        settings.keyring_service.clone(),
    )))
}

#[cfg(not(feature = "keyring-store"))]
fn open_keyring_store(_settings: &Settings) -> Result<Box<dyn SecretStore>> {
    Err(VaultError::Config(
        "keyring support not compiled — rebuild with `cargo build --features keyring-store`"
            .into(),
    ))
}

/// Resolve an id typed by the user into the stored entry.
pub fn require_entry(vault: &Vault, id: i64) -> Result<Entry> {
    vault.find_entry(id)?.ok_or(VaultError::EntryNotFound(id))
}

/// Get the master password from `PASSVAULT_PASSWORD` or an interactive prompt.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// Also respects `PASSVAULT_PASSWORD`. Enforces a minimum length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(VaultError::CommandFailed(format!(
                    "master password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Master password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Read an entry's password: piped stdin if not a terminal, else a hidden prompt.
pub fn read_secret_input(prompt: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\r', '\n']);
        return Ok(Zeroizing::new(trimmed.to_string()));
    }

    let value = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(value))
}
