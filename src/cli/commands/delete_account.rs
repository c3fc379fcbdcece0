//! `credvault delete-account` — remove an account and all of its passwords.

use crate::cli::output;
use crate::cli::{confirm_destructive, login, open_vault, Cli};
use crate::errors::Result;

/// Execute the `delete-account` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let mut vault = open_vault(cli)?;
    let session = login(cli, &vault)?;
    let username = session.owner().to_string();

    let prompt = format!("Delete account '{username}' and every password it owns?");
    if !confirm_destructive(&prompt, force)? {
        return Ok(());
    }

    let removed = vault.delete_account_cascade(&username)?;
    vault.logout(session);
    vault.close()?;

    output::success(&format!(
        "Account '{username}' deleted ({removed} password(s) removed)"
    ));

    Ok(())
}
