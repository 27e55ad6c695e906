//! `passvault delete`: remove an entry and its secret.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, require_entry, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: i64, force: bool) -> Result<()> {
    let (_, mut vault) = open_vault(cli, false)?;
    let entry = require_entry(&vault, id)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{}'?", entry.description))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    vault.delete_entry(entry.id, &entry.secret_key)?;
    output::success(&format!("Deleted '{}'", entry.description));

    Ok(())
}
