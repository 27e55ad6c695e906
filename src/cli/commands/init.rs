//! `passvault init`: create the metadata database and the secret store.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::config::SecretBackend;
use crate::errors::Result;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (settings, vault) = open_vault(cli, true)?;
    let cwd = std::env::current_dir()?;

    let count = vault.list_entries()?.len();
    output::success(&format!(
        "Vault ready at {} ({} backend, {count} saved)",
        settings.data_path(&cwd).display(),
        settings.secret_backend
    ));

    if settings.secret_backend == SecretBackend::File {
        output::tip(&format!(
            "Set {} to skip the master password prompt in scripts.",
            crate::cli::PASSWORD_ENV
        ));
    }
    output::tip("Run `passvault new` to save a password.");

    Ok(())
}
