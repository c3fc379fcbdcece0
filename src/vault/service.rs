//! Owner-scoped vault operations.
//!
//! `VaultService` owns two `RecordStore`s:
//!
//! - `accounts`: `username -> password`, owner always `""`
//! - `secrets`: `app name -> secret`, owner = authenticated username
//!
//! Secret operations take a `Session` instead of reading ambient
//! "logged-in user" state.

use std::path::Path;

use subtle::ConstantTimeEq;

use crate::config::Settings;
use crate::errors::{CredVaultError, Result};
use crate::store::RecordStore;

use super::generator::{generate_random_secret, DEFAULT_CHARSET};
use super::session::Session;

/// Owner value of every account record.
const ACCOUNT_OWNER: &str = "";

/// Maximum length (in characters) of a username or application name.
const MAX_NAME_LEN: usize = 256;

/// One decoded secret belonging to a session owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSecret {
    pub app_name: String,
    pub secret: String,
}

/// Accounts plus per-owner secrets.
#[derive(Debug)]
pub struct VaultService {
    accounts: RecordStore,
    secrets: RecordStore,
}

impl VaultService {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open both stores under `data_dir` using `settings`.
    pub fn open(data_dir: &Path, settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let accounts = RecordStore::open(
            &settings.accounts_path(data_dir),
            settings.capacity,
            settings.build_codec()?,
        )?;
        let secrets = RecordStore::open(
            &settings.secrets_path(data_dir),
            settings.capacity,
            settings.build_codec()?,
        )?;

        Ok(Self::from_stores(accounts, secrets))
    }

    /// Build a service from already-opened stores.
    pub fn from_stores(accounts: RecordStore, secrets: RecordStore) -> Self {
        Self { accounts, secrets }
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Register a new account.
    pub fn create_account(&mut self, username: &str, password: &str) -> Result<()> {
        validate_name(username, "username")?;
        if password.is_empty() {
            return Err(CredVaultError::CommandFailed(
                "password cannot be empty".into(),
            ));
        }
        if self.accounts.contains(username, ACCOUNT_OWNER) {
            return Err(CredVaultError::DuplicateUsername(username.to_string()));
        }

        self.accounts.insert(username, password, ACCOUNT_OWNER)?;
        tracing::info!(username, "account created");
        Ok(())
    }

    /// Check `password` against the stored one and hand out a session.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session> {
        let Some(stored) = self.accounts.get(username, ACCOUNT_OWNER) else {
            tracing::debug!(username, "login for unknown account");
            return Err(CredVaultError::AuthFailure);
        };

        if bool::from(stored.as_bytes().ct_eq(password.as_bytes())) {
            Ok(Session::new(username))
        } else {
            tracing::debug!(username, "login with wrong password");
            Err(CredVaultError::AuthFailure)
        }
    }

    /// End a session.  The store keeps no session state, so this only
    /// consumes the token.
    pub fn logout(&self, session: Session) {
        tracing::debug!(owner = session.owner(), "logged out");
    }

    /// Remove an account and every secret it owns.
    ///
    /// Owner is not part of the hash key, so this scans the whole
    /// secrets table.  Returns the number of secrets removed.
    pub fn delete_account_cascade(&mut self, username: &str) -> Result<usize> {
        if self.accounts.remove_all(username, ACCOUNT_OWNER) == 0 {
            return Err(CredVaultError::AccountNotFound(username.to_string()));
        }

        let removed = self.secrets.remove_owned_by(username);
        tracing::info!(username, secrets = removed, "account deleted");
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Secrets
    // ------------------------------------------------------------------

    /// Store `secret` for `app_name`, replacing any existing entry.
    pub fn put_secret(&mut self, session: &Session, app_name: &str, secret: &str) -> Result<()> {
        validate_name(app_name, "application name")?;
        self.require_account(session)?;

        let owner = session.owner();
        self.secrets.remove_all(app_name, owner);
        self.secrets.insert(app_name, secret, owner)
    }

    /// Replace the secret for an application that must already exist.
    pub fn modify_secret(
        &mut self,
        session: &Session,
        app_name: &str,
        new_secret: &str,
    ) -> Result<()> {
        self.require_account(session)?;
        if !self.secrets.contains(app_name, session.owner()) {
            return Err(CredVaultError::SecretNotFound(app_name.to_string()));
        }
        self.put_secret(session, app_name, new_secret)
    }

    /// Return the secret stored for `app_name`.
    pub fn get_secret(&self, session: &Session, app_name: &str) -> Result<String> {
        self.require_account(session)?;
        self.secrets
            .get(app_name, session.owner())
            .map(str::to_string)
            .ok_or_else(|| CredVaultError::SecretNotFound(app_name.to_string()))
    }

    /// Remove the secret stored for `app_name`.
    pub fn remove_secret(&mut self, session: &Session, app_name: &str) -> Result<()> {
        self.require_account(session)?;
        if self.secrets.remove_all(app_name, session.owner()) == 0 {
            return Err(CredVaultError::SecretNotFound(app_name.to_string()));
        }
        Ok(())
    }

    /// All secrets owned by the session, sorted by application name.
    pub fn list_secrets(&self, session: &Session) -> Result<Vec<StoredSecret>> {
        self.require_account(session)?;

        let mut list: Vec<StoredSecret> = self
            .secrets
            .records_owned_by(session.owner())
            .into_iter()
            .map(|(app_name, secret)| StoredSecret { app_name, secret })
            .collect();

        list.sort_by(|a, b| a.app_name.cmp(&b.app_name));
        Ok(list)
    }

    /// Generate a random secret with the default charset, store it for
    /// `app_name`, and return it.
    pub fn generate_secret_for(
        &mut self,
        session: &Session,
        app_name: &str,
        length: usize,
    ) -> Result<String> {
        let secret = generate_random_secret(length, DEFAULT_CHARSET)?;
        self.put_secret(session, app_name, &secret)?;
        Ok(secret)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write both stores to disk.
    pub fn save(&mut self) -> Result<()> {
        self.accounts.save()?;
        self.secrets.save()
    }

    /// Save both stores and release them.
    ///
    /// Both stores are always attempted; the first error is returned.
    pub fn close(self) -> Result<()> {
        let Self { accounts, secrets } = self;
        let accounts_result = accounts.close();
        let secrets_result = secrets.close();
        accounts_result.and(secrets_result)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn secret_count(&self) -> usize {
        self.secrets.len()
    }

    /// Returns `true` if an account named `username` exists.
    pub fn has_account(&self, username: &str) -> bool {
        self.accounts.contains(username, ACCOUNT_OWNER)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// A session outlives its account if the account is deleted.
    fn require_account(&self, session: &Session) -> Result<()> {
        if self.has_account(session.owner()) {
            Ok(())
        } else {
            Err(CredVaultError::AuthFailure)
        }
    }
}

/// Validate a username or application name.
///
/// Must be non-empty, at most 256 characters, and free of control
/// characters.  Commas and other punctuation are fine.
fn validate_name(name: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CredVaultError::InvalidName(format!("{what} cannot be empty")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CredVaultError::InvalidName(format!(
            "{what} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(CredVaultError::InvalidName(format!(
            "{what} cannot contain control characters"
        )));
    }
    Ok(())
}
