//! `credvault generate` — create a random password and store it.

use crate::cli::output;
use crate::cli::{login, open_vault, Cli};
use crate::errors::Result;

/// Execute the `generate` command.
///
/// The password is only echoed with `--print`; otherwise read it back
/// with `credvault get`.
pub fn execute(cli: &Cli, app: &str, length: usize, print: bool) -> Result<()> {
    let mut vault = open_vault(cli)?;
    let session = login(cli, &vault)?;

    let secret = vault.generate_secret_for(&session, app, length)?;
    vault.close()?;

    output::success(&format!("Generated {length}-character password for '{app}'"));
    if print {
        println!("{secret}");
    } else {
        output::tip(&format!("Run `credvault get {app}` to view it."));
    }

    Ok(())
}
