//! Stream variant: byte-wise XOR against a cyclically repeated key.
//!
//! Output length always equals input length and any byte sequence is a
//! valid input.  XOR is its own inverse, so `decrypt` is `encrypt`
//! under another name.

use crate::errors::{CredVaultError, Result};

use super::ObfuscationCodec;

/// XOR `plaintext` against `key`, repeating the key as needed.
///
/// Fails only when `key` is empty.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.is_empty() {
        return Err(CredVaultError::ConfigError(
            "xor codec key cannot be empty".into(),
        ));
    }
    Ok(apply(plaintext, key))
}

/// Reverse `encrypt`.  Same operation, same key.
pub fn decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    encrypt(ciphertext, key)
}

fn apply(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(byte, k)| byte ^ k)
        .collect()
}

/// Repeating-key XOR codec holding a validated, non-empty key.
#[derive(Debug, Clone)]
pub struct XorCodec {
    key: Vec<u8>,
}

impl XorCodec {
    /// Build a codec from a key.  Empty keys are rejected.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(CredVaultError::ConfigError(
                "xor codec key cannot be empty".into(),
            ));
        }
        Ok(Self { key: key.to_vec() })
    }
}

impl ObfuscationCodec for XorCodec {
    fn name(&self) -> &'static str {
        "xor"
    }

    fn obscure(&self, plain: &[u8]) -> Vec<u8> {
        apply(plain, &self.key)
    }

    fn reveal(&self, obscured: &[u8]) -> Vec<u8> {
        apply(obscured, &self.key)
    }
}
