//! `passvault list`: display all entries in a table.
//!
//! Only the metadata table is read, so no master password is needed.

use crate::cli::output;
use crate::cli::{open_metadata, Cli};
use crate::errors::Result;
use crate::metadata::MetadataTable;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let table = open_metadata(cli)?;
    let entries = table.list()?;
    output::print_entries_table(&entries);
    Ok(())
}
