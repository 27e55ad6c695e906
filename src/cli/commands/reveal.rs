//! `passvault reveal`: show (or copy) one entry's password.

use crate::cli::output;
use crate::cli::{open_vault, require_entry, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `reveal` command.
///
/// Printing never fails on a missing secret; the configured placeholder
/// is shown instead. Copying does fail, since an empty clipboard would
/// be misleading.
pub fn execute(cli: &Cli, id: i64, copy: bool) -> Result<()> {
    let (settings, vault) = open_vault(cli, false)?;
    let entry = require_entry(&vault, id)?;

    if copy {
        let secret = vault.reveal_secret(&entry.secret_key)?;
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| VaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
        clipboard
            .set_text(secret.as_str())
            .map_err(|e| VaultError::CommandFailed(format!("clipboard write: {e}")))?;
        output::success(&format!(
            "Password for '{}' copied to clipboard",
            entry.description
        ));
        return Ok(());
    }

    let secret = vault.reveal_or_placeholder(&entry.secret_key, &settings.reveal_placeholder);
    println!("{}", secret.as_str());
    Ok(())
}
