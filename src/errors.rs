use thiserror::Error;

/// All errors that can occur in CredVault.
#[derive(Debug, Error)]
pub enum CredVaultError {
    // --- Account errors ---
    #[error("Username '{0}' already exists — choose another one")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    AuthFailure,

    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    // --- Secret errors ---
    #[error("No secret stored for application '{0}'")]
    SecretNotFound(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    // --- Store errors ---
    #[error("Table is full — all {capacity} slots are in use")]
    CapacityExhausted { capacity: usize },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for CredVault results.
pub type Result<T> = std::result::Result<T, CredVaultError>;
