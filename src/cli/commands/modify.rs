//! `credvault modify` — replace the password of an existing application.

use crate::cli::output;
use crate::cli::{login, open_vault, read_secret_value, Cli};
use crate::errors::Result;

/// Execute the `modify` command.
pub fn execute(cli: &Cli, app: &str, value: Option<&str>) -> Result<()> {
    let mut vault = open_vault(cli)?;
    let session = login(cli, &vault)?;

    // Fail before prompting for a value that would be thrown away.
    vault.get_secret(&session, app)?;

    let secret = read_secret_value(app, value)?;
    vault.modify_secret(&session, app, &secret)?;
    vault.close()?;

    output::success(&format!("Password for '{app}' modified"));

    Ok(())
}
