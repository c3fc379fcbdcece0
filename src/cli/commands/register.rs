//! `credvault register` — create a new account.

use crate::cli::output;
use crate::cli::{open_vault, prompt_new_password, resolve_user, Cli};
use crate::errors::Result;

/// Execute the `register` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = open_vault(cli)?;

    let username = resolve_user(cli)?;
    let password = prompt_new_password()?;

    vault.create_account(&username, &password)?;
    vault.close()?;

    output::success(&format!("Account '{username}' created"));
    output::tip("Store a password: credvault add <APP>");

    Ok(())
}
