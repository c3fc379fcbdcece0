//! `credvault add` — store a password for an application.

use crate::cli::output;
use crate::cli::{login, open_vault, read_secret_value, Cli};
use crate::errors::Result;

/// Execute the `add` command.
pub fn execute(cli: &Cli, app: &str, value: Option<&str>) -> Result<()> {
    let mut vault = open_vault(cli)?;
    let session = login(cli, &vault)?;

    let secret = read_secret_value(app, value)?;
    let existed = vault.get_secret(&session, app).is_ok();

    vault.put_secret(&session, app, &secret)?;
    vault.close()?;

    if existed {
        output::success(&format!("Password for '{app}' replaced"));
    } else {
        output::success(&format!("Password for '{app}' added"));
    }

    Ok(())
}
