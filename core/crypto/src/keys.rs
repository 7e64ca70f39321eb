//! Cipher key with secure memory handling.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use kinvault_common::{Error, Result};

/// Environment variable the key is read from unless configured otherwise.
pub const DEFAULT_KEY_ENV: &str = "KINVAULT_CIPHER_KEY";

/// Shared secret for the vault cipher.
///
/// One key is configured per deployment. The key bytes are zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    key: Vec<u8>,
}

impl CipherKey {
    /// Create a key from raw bytes.
    ///
    /// # Errors
    /// - Returns `Config` if `key` is empty
    pub fn from_bytes(key: impl Into<Vec<u8>>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::Config("Cipher key cannot be empty".to_string()));
        }
        Ok(Self { key })
    }

    /// Read the key from an environment variable.
    ///
    /// # Errors
    /// - Variable unset or not valid unicode
    /// - Variable empty
    pub fn from_env(var: &str) -> Result<Self> {
        let value = std::env::var(var)
            .map_err(|e| Error::Config(format!("Cannot read cipher key from {}: {}", var, e)))?;
        Self::from_bytes(value.into_bytes())
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherKey([REDACTED; {} bytes])", self.key.len())
    }
}
