//! `credvault remove` — delete an application's password.

use crate::cli::output;
use crate::cli::{confirm_destructive, login, open_vault, Cli};
use crate::errors::Result;

/// Execute the `remove` command.
pub fn execute(cli: &Cli, app: &str, force: bool) -> Result<()> {
    let mut vault = open_vault(cli)?;
    let session = login(cli, &vault)?;

    if !confirm_destructive(&format!("Remove password for '{app}'?"), force)? {
        return Ok(());
    }

    vault.remove_secret(&session, app)?;
    vault.close()?;

    output::success(&format!("Removed password for '{app}'"));

    Ok(())
}
