//! Object storage trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::signing::UrlSigner;
use kinvault_common::{Error, ObjectPath, Result};

/// Metadata for a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Location inside the bucket.
    pub path: ObjectPath,
    /// Size in bytes.
    pub size: u64,
    /// Declared content type.
    pub content_type: String,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
    /// Revision tag.
    pub etag: String,
}

/// Time-limited, pre-authorized read link for a private object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUrl {
    pub url: String,
    pub path: ObjectPath,
    pub expires_at: DateTime<Utc>,
}

/// Object storage collaborator for the `vault_files` bucket.
///
/// Implementations own their authentication and transport. Every failure is
/// reported as `Error::Storage`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name (e.g. "memory", "local").
    fn name(&self) -> &str;

    /// Signer used for this bucket's access links.
    fn signer(&self) -> &UrlSigner;

    /// Upload an object.
    ///
    /// # Postconditions
    /// - Object exists at `path` with the given content type
    ///
    /// # Errors
    /// - Object already exists at `path`
    /// - Network/I/O errors
    async fn upload(&self, path: &ObjectPath, data: Vec<u8>, content_type: &str)
        -> Result<ObjectMetadata>;

    /// Download an object.
    async fn download(&self, path: &ObjectPath) -> Result<Vec<u8>>;

    /// Check if an object exists.
    async fn exists(&self, path: &ObjectPath) -> Result<bool>;

    /// Delete an object.
    ///
    /// # Errors
    /// - Object not found
    async fn delete(&self, path: &ObjectPath) -> Result<()>;

    /// Issue a fresh signed read link valid for `ttl`.
    ///
    /// # Errors
    /// - Object not found
    /// - Signing failure
    async fn signed_url(&self, path: &ObjectPath, ttl: Duration) -> Result<SignedUrl> {
        if !self.exists(path).await? {
            return Err(Error::Storage(format!("Object not found: {}", path)));
        }
        self.signer().sign(path, ttl)
    }

    /// Resolve a signed link at time `now` and return the object bytes.
    ///
    /// # Errors
    /// - Signature mismatch, foreign link, or expired link
    /// - Object no longer exists
    async fn open_signed_at(&self, url: &str, now: DateTime<Utc>) -> Result<Vec<u8>> {
        let path = self.signer().verify_at(url, now)?;
        self.download(&path).await
    }

    /// Resolve a signed link against the current time.
    async fn open_signed(&self, url: &str) -> Result<Vec<u8>> {
        self.open_signed_at(url, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_serialization() {
        let metadata = ObjectMetadata {
            path: ObjectPath::parse("fam-1/1-scan.png").unwrap(),
            size: 1024,
            content_type: "image/png".to_string(),
            uploaded_at: Utc::now(),
            etag: "abc123".to_string(),
        };

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: ObjectMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, metadata);
    }
}
