//! `credvault login` — verify credentials without touching any secret.

use crate::cli::output;
use crate::cli::{login, open_vault, Cli};
use crate::errors::Result;

/// Execute the `login` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    let session = login(cli, &vault)?;

    let count = vault.list_secrets(&session)?.len();
    output::success(&format!(
        "Logged in as '{}' ({count} stored password(s))",
        session.owner()
    ));
    vault.logout(session);

    Ok(())
}
