//! `passvault edit`: change an entry's description and/or password.

use crate::cli::output;
use crate::cli::{open_vault, read_secret_input, require_entry, Cli};
use crate::errors::Result;
use crate::vault::VaultEvent;

/// Execute the `edit` command.
pub fn execute(cli: &Cli, id: i64, description: Option<&str>, new_password: bool) -> Result<()> {
    let (_, mut vault) = open_vault(cli, false)?;
    let entry = require_entry(&vault, id)?;

    let secret = if new_password {
        Some(read_secret_input(&format!(
            "New password for '{}'",
            entry.description
        ))?)
    } else {
        None
    };

    let changes = vault.subscribe();
    let result = vault.edit_entry(&entry, description, secret.as_deref().map(String::as_str));

    // Report what was committed, even when a later step failed.
    let mut current = entry.description.clone();
    for event in changes.try_iter() {
        match event {
            VaultEvent::Renamed { .. } => {
                let renamed = description.unwrap_or_default().trim().to_string();
                output::success(&format!("Renamed '{current}' to '{renamed}'"));
                current = renamed;
            }
            VaultEvent::SecretChanged { .. } => {
                output::success(&format!("Password for '{current}' updated"));
            }
            VaultEvent::Created { .. } | VaultEvent::Deleted { .. } => {}
        }
    }

    result.map(|_| ())
}
