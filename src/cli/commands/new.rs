//! `passvault new`: save a new password.

use std::io::{self, IsTerminal};

use crate::cli::output;
use crate::cli::{open_vault, read_secret_input, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `new` command.
pub fn execute(cli: &Cli, description: Option<&str>) -> Result<()> {
    let description = match description {
        Some(d) => d.to_string(),
        None if io::stdin().is_terminal() => dialoguer::Input::<String>::new()
            .with_prompt("What is this password for?")
            .interact_text()
            .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?,
        None => {
            return Err(VaultError::InvalidInput(
                "description is required when stdin is not a terminal".into(),
            ))
        }
    };

    let (_, mut vault) = open_vault(cli, true)?;
    let secret = read_secret_input("Enter password here")?;
    let entry = vault.create_entry(&description, &secret)?;

    output::success(&format!("Saved '{}' (id {})", entry.description, entry.id));
    Ok(())
}
