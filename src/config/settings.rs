use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::{ObfuscationCodec, ShiftCodec, XorCodec};
use crate::errors::{CredVaultError, Result};
use crate::store::{DEFAULT_CAPACITY, MAX_CAPACITY};

/// Vault configuration, loaded from `<data_dir>/.credvault.toml`.
///
/// Every field has a sensible default so CredVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// File (relative to the data dir) holding account credentials.
    #[serde(default = "default_accounts_file")]
    pub accounts_file: String,

    /// File (relative to the data dir) holding per-owner secrets.
    #[serde(default = "default_secrets_file")]
    pub secrets_file: String,

    /// Slot count of each table.  Fixed once data has been written.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Obfuscation applied to values at rest.
    #[serde(default)]
    pub codec: CodecSettings,
}

/// Which obfuscation codec to apply, if any.
///
/// In TOML:
///
/// ```toml
/// [codec]
/// kind = "xor"
/// key = "correct horse"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CodecSettings {
    /// Values are stored as-is.
    #[default]
    None,

    /// Repeating-key XOR.
    Xor { key: String },

    /// Fixed-offset alphabetic shift.  Much weaker than `Xor`.
    Shift {
        #[serde(default = "default_shift_offset")]
        offset: u8,
    },
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_accounts_file() -> String {
    "users.txt".to_string()
}

fn default_secrets_file() -> String {
    "vault.txt".to_string()
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_shift_offset() -> u8 {
    crate::codec::shift::DEFAULT_OFFSET
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            accounts_file: default_accounts_file(),
            secrets_file: default_secrets_file(),
            capacity: default_capacity(),
            codec: CodecSettings::default(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the data directory.
    pub const FILE_NAME: &'static str = ".credvault.toml";

    /// Load settings from `<data_dir>/.credvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or fails validation,
    /// an error is returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CredVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.capacity < 2 {
            return Err(CredVaultError::ConfigError(format!(
                "capacity must be at least 2, got {}",
                self.capacity
            )));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(CredVaultError::ConfigError(format!(
                "capacity must be at most {MAX_CAPACITY}, got {}",
                self.capacity
            )));
        }
        if let CodecSettings::Xor { key } = &self.codec {
            if key.is_empty() {
                return Err(CredVaultError::ConfigError(
                    "codec.key cannot be empty for the xor codec".into(),
                ));
            }
        }
        if self.accounts_file == self.secrets_file {
            return Err(CredVaultError::ConfigError(
                "accounts_file and secrets_file must differ".into(),
            ));
        }
        Ok(())
    }

    /// Full path to the accounts file.
    pub fn accounts_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.accounts_file)
    }

    /// Full path to the secrets file.
    pub fn secrets_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.secrets_file)
    }

    /// Instantiate the configured codec.
    pub fn build_codec(&self) -> Result<Option<Box<dyn ObfuscationCodec>>> {
        let codec: Box<dyn ObfuscationCodec> = match &self.codec {
            CodecSettings::None => return Ok(None),
            CodecSettings::Xor { key } => Box::new(XorCodec::new(key.as_bytes())?),
            CodecSettings::Shift { offset } => Box::new(ShiftCodec::new(*offset)),
        };
        Ok(Some(codec))
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.accounts_file, "users.txt");
        assert_eq!(s.secrets_file, "vault.txt");
        assert_eq!(s.capacity, 100);
        assert_eq!(s.codec, CodecSettings::None);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.capacity, 100);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
accounts_file = "accounts.db"
secrets_file = "secrets.db"
capacity = 211

[codec]
kind = "xor"
key = "correct horse"
"#;
        fs::write(tmp.path().join(".credvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.accounts_file, "accounts.db");
        assert_eq!(settings.secrets_file, "secrets.db");
        assert_eq!(settings.capacity, 211);
        assert_eq!(
            settings.codec,
            CodecSettings::Xor {
                key: "correct horse".into()
            }
        );
    }

    #[test]
    fn shift_offset_defaults_to_three() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(".credvault.toml"),
            "[codec]\nkind = \"shift\"\n",
        )
        .unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.codec, CodecSettings::Shift { offset: 3 });
        let codec = settings.build_codec().unwrap().unwrap();
        assert_eq!(codec.name(), "shift");
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".credvault.toml"), "capacity = 50\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.capacity, 50);
        assert_eq!(settings.secrets_file, "vault.txt");
        assert!(settings.build_codec().unwrap().is_none());
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".credvault.toml"), "not valid {{toml").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn rejects_empty_xor_key_and_tiny_capacity() {
        let s = Settings {
            codec: CodecSettings::Xor { key: String::new() },
            ..Settings::default()
        };
        assert!(s.validate().is_err());

        let s = Settings {
            capacity: 1,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn huge_capacity_is_a_config_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(".credvault.toml"),
            "capacity = 1000000000000\n",
        )
        .unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(CredVaultError::ConfigError(_))));
    }

    #[test]
    fn paths_are_relative_to_data_dir() {
        let s = Settings::default();
        let dir = Path::new("/home/user/.credvault");
        assert_eq!(
            s.accounts_path(dir),
            PathBuf::from("/home/user/.credvault/users.txt")
        );
        assert_eq!(
            s.secrets_path(dir),
            PathBuf::from("/home/user/.credvault/vault.txt")
        );
    }
}
