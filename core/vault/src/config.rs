//! Vault deployment configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use kinvault_common::{Error, Result};
use kinvault_crypto::{CipherKey, DEFAULT_KEY_ENV};

/// Validity of signed file links unless configured otherwise.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;

/// Category recorded when a request names none.
pub const DEFAULT_CATEGORY: &str = "other";

/// Record table file name used by local deployments.
pub const RECORDS_FILENAME: &str = "vault_items.json";

/// Object store backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    /// Registered backend name (e.g. "memory", "local").
    pub provider_type: String,
    /// Backend-specific configuration.
    #[serde(default)]
    pub provider_config: serde_json::Value,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            provider_type: "memory".to_string(),
            provider_config: serde_json::Value::Null,
        }
    }
}

/// Deployment-wide vault settings.
///
/// The cipher key itself never appears here; only the name of the
/// environment variable holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Environment variable holding the shared cipher key.
    pub cipher_key_env: String,
    /// Validity of signed file links, in seconds.
    pub signed_url_ttl_secs: u64,
    /// Category for items added without one.
    pub default_category: String,
    /// Object store backend.
    pub object_store: ObjectStoreConfig,
    /// Record table file for local deployments.
    pub records_path: Option<PathBuf>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            cipher_key_env: DEFAULT_KEY_ENV.to_string(),
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
            default_category: DEFAULT_CATEGORY.to_string(),
            object_store: ObjectStoreConfig::default(),
            records_path: None,
        }
    }
}

impl VaultConfig {
    /// Configuration for a local deployment rooted at `root`.
    ///
    /// Files go to `root/files`, records to `root/vault_items.json`.
    pub fn local(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            object_store: ObjectStoreConfig {
                provider_type: "local".to_string(),
                provider_config: serde_json::json!({
                    "root": root.join("files").to_string_lossy()
                }),
            },
            records_path: Some(root.join(RECORDS_FILENAME)),
            ..Self::default()
        }
    }

    /// Check invariants.
    ///
    /// # Errors
    /// - Empty key variable name
    /// - Zero link validity
    /// - Empty object store type
    pub fn validate(&self) -> Result<()> {
        if self.cipher_key_env.trim().is_empty() {
            return Err(Error::Config("cipher_key_env cannot be empty".to_string()));
        }
        if self.signed_url_ttl_secs == 0 {
            return Err(Error::Config(
                "signed_url_ttl_secs must be positive".to_string(),
            ));
        }
        if self.object_store.provider_type.trim().is_empty() {
            return Err(Error::Config(
                "object_store.provider_type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Link validity as a duration.
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    /// Load the cipher key from the configured environment variable.
    pub fn cipher_key(&self) -> Result<CipherKey> {
        CipherKey::from_env(&self.cipher_key_env)
    }

    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VaultConfig::default();
        assert_eq!(config.cipher_key_env, "KINVAULT_CIPHER_KEY");
        assert_eq!(config.signed_url_ttl(), Duration::from_secs(3600));
        assert_eq!(config.default_category, "other");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = VaultConfig::from_json(r#"{ "signed_url_ttl_secs": 600 }"#).unwrap();
        assert_eq!(config.signed_url_ttl_secs, 600);
        assert_eq!(config.object_store.provider_type, "memory");
    }

    #[test]
    fn test_config_serialization() {
        let config = VaultConfig::local("/srv/kinvault");
        let json = config.to_json().unwrap();
        let restored = VaultConfig::from_json(&json).unwrap();

        assert_eq!(restored, config);
        assert_eq!(restored.object_store.provider_type, "local");
        assert_eq!(
            restored.records_path.as_deref(),
            Some(Path::new("/srv/kinvault/vault_items.json"))
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(VaultConfig::from_json(r#"{ "signed_url_ttl_secs": 0 }"#).is_err());
        assert!(VaultConfig::from_json(r#"{ "cipher_key_env": " " }"#).is_err());
        assert!(VaultConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("kinvault.json");
        std::fs::write(&path, VaultConfig::default().to_json().unwrap()).unwrap();

        assert_eq!(VaultConfig::load(&path).unwrap(), VaultConfig::default());
        assert!(VaultConfig::load(temp_dir.path().join("missing.json")).is_err());
    }
}
