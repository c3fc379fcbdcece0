//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{CredVaultError, Result};
use crate::vault::{Session, VaultService, DEFAULT_LENGTH};

/// Environment variable consulted before prompting for a password.
const PASSWORD_ENV: &str = "CREDVAULT_PASSWORD";

/// CredVault CLI: local credential vault.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Local credential vault for application passwords",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the vault files (default: .credvault)
    #[arg(long, default_value = ".credvault", env = "CREDVAULT_DIR", global = true)]
    pub data_dir: String,

    /// Account to act as (prompted when omitted)
    #[arg(short, long, env = "CREDVAULT_USER", global = true)]
    pub user: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new account
    Register,

    /// Check account credentials
    Login,

    /// Store a password for an application
    Add {
        /// Application name (e.g. github)
        app: String,
        /// Password (omit for interactive prompt)
        value: Option<String>,
    },

    /// Print the password stored for an application
    Get {
        /// Application name
        app: String,
    },

    /// List stored applications
    List {
        /// Show passwords instead of masking them
        #[arg(long)]
        show: bool,
    },

    /// Change the password stored for an existing application
    Modify {
        /// Application name
        app: String,
        /// New password (omit for interactive prompt)
        value: Option<String>,
    },

    /// Remove an application's password
    Remove {
        /// Application name
        app: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate and store a random password for an application
    Generate {
        /// Application name
        app: String,
        /// Number of characters
        #[arg(short, long, default_value_t = DEFAULT_LENGTH)]
        length: usize,
        /// Print the generated password
        #[arg(long)]
        print: bool,
    },

    /// Delete your account and every password it owns
    DeleteAccount {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the data directory from the CLI arguments.
///
/// Relative paths are taken from the current directory.
pub fn data_dir(cli: &Cli) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(&cli.data_dir))
}

/// Load settings and open the vault in the data directory.
pub fn open_vault(cli: &Cli) -> Result<VaultService> {
    let dir = data_dir(cli)?;
    let settings = Settings::load(&dir)?;
    VaultService::open(&dir, &settings)
}

/// The account name from `--user` / `CREDVAULT_USER`, or a prompt.
pub fn resolve_user(cli: &Cli) -> Result<String> {
    if let Some(user) = &cli.user {
        return Ok(user.clone());
    }
    dialoguer::Input::<String>::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(|e| CredVaultError::CommandFailed(format!("username prompt: {e}")))
}

/// Get the account password, trying in order:
/// 1. `CREDVAULT_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `register`).
///
/// Also respects `CREDVAULT_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Choose password")
        .with_confirmation("Confirm password", "Passwords do not match, try again")
        .interact()
        .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

fn password_from_env() -> Option<Zeroizing<String>> {
    match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Resolve the user, ask for the password, and authenticate.
pub fn login(cli: &Cli, vault: &VaultService) -> Result<Session> {
    let username = resolve_user(cli)?;
    let password = prompt_password()?;
    vault.authenticate(&username, &password)
}

/// Read a secret value from one of three sources:
/// the command line, piped stdin, or a hidden prompt.
pub fn read_secret_value(app: &str, value: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = value {
        output::warning("Value provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(Zeroizing::new(buf.trim_end().to_string()));
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Password for {app}"))
        .interact()
        .map_err(|e| CredVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Confirm a destructive change unless `force` is set.
///
/// Returns `Ok(false)`, after printing "Cancelled.", when the user
/// declines or when stdin is not a terminal to ask on.
pub fn confirm_destructive(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        output::warning("Not a terminal; pass --force to skip confirmation.");
        output::info("Cancelled.");
        return Ok(false);
    }
    let confirmed = confirm(prompt)?;
    if !confirmed {
        output::info("Cancelled.");
    }
    Ok(confirmed)
}

/// Ask a yes/no question, defaulting to no.
fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CredVaultError::CommandFailed(format!("confirm prompt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "credvault", "get", "github", "--user", "alice", "--data-dir", "/tmp/x",
        ]);
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(cli.data_dir, "/tmp/x");
        assert!(matches!(cli.command, Commands::Get { ref app } if app == "github"));
    }

    #[test]
    fn generate_length_defaults_to_twelve() {
        let cli = Cli::parse_from(["credvault", "generate", "bank"]);
        assert!(matches!(
            cli.command,
            Commands::Generate { length: 12, print: false, .. }
        ));

        let cli = Cli::parse_from(["credvault", "generate", "bank", "--print"]);
        assert!(matches!(cli.command, Commands::Generate { print: true, .. }));
    }

    #[test]
    fn verbosity_counts_flags() {
        let cli = Cli::parse_from(["credvault", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }
}
