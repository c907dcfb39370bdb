use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::WalletError;

/// Wallet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Location of the credential record file.
    #[serde(default = "WalletConfig::default_wallet_path")]
    pub wallet_path: PathBuf,

    /// Deadline applied to every ledger call, in seconds.
    #[serde(default = "WalletConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl WalletConfig {
    fn default_wallet_path() -> PathBuf {
        PathBuf::from("Wallet")
    }

    fn default_request_timeout_secs() -> u64 {
        30
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Loads configuration from a TOML file; absent keys fall back to
    /// their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&raw)
            .map_err(|err| WalletError::StorageError(format!("invalid config: {}", err)))
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            wallet_path: Self::default_wallet_path(),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_field_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.wallet_path, PathBuf::from("Wallet"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: WalletConfig = toml::from_str("wallet_path = \"/tmp/w\"").unwrap();
        assert_eq!(config.wallet_path, PathBuf::from("/tmp/w"));
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.toml");
        std::fs::write(&path, "request_timeout_secs = 5\n").unwrap();
        let config = WalletConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert!(WalletConfig::from_toml_file(dir.path().join("missing.toml")).is_err());
    }
}
