//! Random secret generation.

use rand::Rng;

use crate::errors::{CredVaultError, Result};

/// Characters used when the caller does not supply a charset.
pub const DEFAULT_CHARSET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Length used when the caller does not supply one.
pub const DEFAULT_LENGTH: usize = 12;

/// Upper bound on generated length.
pub const MAX_LENGTH: usize = 1024;

/// Build a random string of `length` characters drawn uniformly from
/// `charset`, using the thread-local CSPRNG.
pub fn generate_random_secret(length: usize, charset: &str) -> Result<String> {
    if length == 0 || length > MAX_LENGTH {
        return Err(CredVaultError::CommandFailed(format!(
            "secret length must be between 1 and {MAX_LENGTH}, got {length}"
        )));
    }

    let chars: Vec<char> = charset.chars().collect();
    if chars.is_empty() {
        return Err(CredVaultError::CommandFailed(
            "charset cannot be empty".into(),
        ));
    }

    let mut rng = rand::rng();
    Ok((0..length)
        .map(|_| chars[rng.random_range(0..chars.len())])
        .collect())
}
