//! Local filesystem object store.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::provider::{ObjectMetadata, ObjectStore};
use crate::signing::{UrlSigner, SECRET_LENGTH};
use kinvault_common::{Error, ObjectPath, Result};

/// Base URL for links issued by a local bucket.
pub const LOCAL_SIGNING_BASE: &str = "local://vault_files/object";

/// File holding the bucket's signing secret, relative to the root.
const SIGNING_KEY_FILENAME: &str = ".signing-key";

/// Directory-backed object store.
///
/// Objects live at `root/<path components>`. The signing secret is kept in
/// `root/.signing-key` so links stay verifiable across process restarts.
pub struct LocalObjectStore {
    root: PathBuf,
    signer: UrlSigner,
}

impl LocalObjectStore {
    /// Open (or create) a store rooted at `root`.
    ///
    /// # Postconditions
    /// - Root directory exists
    /// - A signing secret exists under the root
    ///
    /// # Errors
    /// - Permission denied
    /// - Corrupt signing secret file
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }

        let secret = Self::load_or_create_secret(&root)?;
        let signer = UrlSigner::new(LOCAL_SIGNING_BASE, secret)?;

        Ok(Self { root, signer })
    }

    fn load_or_create_secret(root: &Path) -> Result<[u8; SECRET_LENGTH]> {
        let key_path = root.join(SIGNING_KEY_FILENAME);
        if key_path.exists() {
            let bytes = std::fs::read(&key_path)?;
            return bytes.as_slice().try_into().map_err(|_| {
                Error::Storage(format!("Corrupt signing secret at {}", key_path.display()))
            });
        }

        let secret: [u8; SECRET_LENGTH] = rand::random();
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&key_path)?;
        std::io::Write::write_all(&mut file, &secret)?;
        debug!(path = %key_path.display(), "Created bucket signing secret");
        Ok(secret)
    }

    /// Root directory of the bucket.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of `path`, or `None` for the signing secret.
    fn to_fs_path(&self, path: &ObjectPath) -> Option<PathBuf> {
        if path.components() == [SIGNING_KEY_FILENAME] {
            return None;
        }
        let mut fs_path = self.root.clone();
        for component in path.components() {
            fs_path.push(component);
        }
        Some(fs_path)
    }

    fn existing_file(&self, path: &ObjectPath) -> Result<PathBuf> {
        self.to_fs_path(path)
            .filter(|p| p.is_file())
            .ok_or_else(|| Error::Storage(format!("Object not found: {}", path)))
    }
}

/// Write and flush `data`, removing the file at `fs_path` if either fails.
async fn write_or_discard<W>(mut writer: W, fs_path: &Path, data: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(data).await?;
        writer.flush().await
    }
    .await;

    if written.is_err() {
        drop(writer);
        if let Err(e) = fs::remove_file(fs_path).await {
            warn!(path = %fs_path.display(), error = %e, "Failed to remove partial upload");
        }
    }
    written
}

fn storage_err(context: &str, path: &ObjectPath, e: std::io::Error) -> Error {
    Error::Storage(format!("{} {}: {}", context, path, e))
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    async fn upload(
        &self,
        path: &ObjectPath,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<ObjectMetadata> {
        let fs_path = self
            .to_fs_path(path)
            .ok_or_else(|| Error::Storage(format!("Reserved object path: {}", path)))?;

        if let Some(parent) = fs_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_err("Cannot create directory for", path, e))?;
        }

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&fs_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    Error::Storage(format!("Object already exists: {}", path))
                }
                _ => storage_err("Cannot create", path, e),
            })?;
        write_or_discard(file, &fs_path, &data)
            .await
            .map_err(|e| storage_err("Cannot write", path, e))?;

        Ok(ObjectMetadata {
            path: path.clone(),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            uploaded_at: Utc::now(),
            etag: Uuid::new_v4().to_string(),
        })
    }

    async fn download(&self, path: &ObjectPath) -> Result<Vec<u8>> {
        let fs_path = self.existing_file(path)?;
        fs::read(&fs_path)
            .await
            .map_err(|e| storage_err("Cannot read", path, e))
    }

    async fn exists(&self, path: &ObjectPath) -> Result<bool> {
        Ok(self.to_fs_path(path).is_some_and(|p| p.is_file()))
    }

    async fn delete(&self, path: &ObjectPath) -> Result<()> {
        let fs_path = self.existing_file(path)?;
        fs::remove_file(&fs_path)
            .await
            .map_err(|e| storage_err("Cannot remove", path, e))
    }
}
