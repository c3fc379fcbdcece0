//! `credvault list` — display stored applications in a table.

use crate::cli::output;
use crate::cli::{login, open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, show: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let session = login(cli, &vault)?;

    let secrets = vault.list_secrets(&session)?;

    output::info(&format!(
        "{} — {} stored password(s)",
        session.owner(),
        secrets.len()
    ));
    output::print_secrets_table(&secrets, show);

    Ok(())
}
