//! `credvault get` — print the password stored for one application.

use crate::cli::{login, open_vault, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, app: &str) -> Result<()> {
    let vault = open_vault(cli)?;
    let session = login(cli, &vault)?;

    let secret = vault.get_secret(&session, app)?;
    println!("{secret}");

    Ok(())
}
