//! Vault access manager.
//!
//! Decides which items a caller may see, encrypts and reveals text secrets,
//! and drives the upload / link / delete lifecycle of attached files. All
//! state lives in the injected collaborators.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{VaultConfig, DEFAULT_CATEGORY, DEFAULT_SIGNED_URL_TTL_SECS};
use crate::paths::file_object_path;
use crate::policy;
use crate::request::{AddItemRequest, CreatedItem, DeleteOutcome, FileUpload, OrphanedFile};
use crate::session::{IdentityProvider, SessionToken};
use kinvault_common::{
    Error, Identity, ItemId, ItemPayload, NewVaultRecord, ObjectPath, Result, SensitiveString,
    VaultItem, Visibility,
};
use kinvault_crypto::XorCipher;
use kinvault_storage::{ObjectStore, RecordStore, SignedUrl};

/// Validated payload of an add request.
enum Content {
    Secret(String),
    File(FileUpload),
}

fn into_storage(e: Error) -> Error {
    match e {
        Error::Storage(_) => e,
        other => Error::Storage(other.to_string()),
    }
}

fn into_persistence(e: Error) -> Error {
    match e {
        Error::Persistence(_) | Error::NotFound(_) => e,
        other => Error::Persistence(other.to_string()),
    }
}

/// Entry point used by the application screens.
pub struct VaultAccessManager {
    records: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
    auth: Arc<dyn IdentityProvider>,
    cipher: XorCipher,
    signed_url_ttl: Duration,
    default_category: String,
}

impl VaultAccessManager {
    /// Create a manager over explicit collaborators with default settings.
    pub fn new(
        records: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
        auth: Arc<dyn IdentityProvider>,
        cipher: XorCipher,
    ) -> Self {
        Self {
            records,
            objects,
            auth,
            cipher,
            signed_url_ttl: Duration::from_secs(DEFAULT_SIGNED_URL_TTL_SECS),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Create a manager using the settings and cipher key from `config`.
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Cipher key variable unset or empty
    pub fn from_config(
        config: &VaultConfig,
        records: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
        auth: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let cipher = XorCipher::new(config.cipher_key()?);
        Ok(Self::new(records, objects, auth, cipher)
            .with_signed_url_ttl(config.signed_url_ttl())
            .with_default_category(config.default_category.clone()))
    }

    /// Set the validity of issued file links.
    pub fn with_signed_url_ttl(mut self, ttl: Duration) -> Self {
        self.signed_url_ttl = ttl;
        self
    }

    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    pub fn signed_url_ttl(&self) -> Duration {
        self.signed_url_ttl
    }

    /// Resolve the caller behind a session through the auth collaborator.
    pub async fn identity_for(&self, token: &SessionToken) -> Result<Identity> {
        self.auth.identity(token).await
    }

    /// Filter a family snapshot to the items `identity` may see, newest first.
    ///
    /// Pure; items outside the caller's family are dropped.
    pub fn list_visible_items(&self, identity: &Identity, items: Vec<VaultItem>) -> Vec<VaultItem> {
        policy::filter_visible(identity, items)
    }

    /// Fetch the caller's family items and return the visible ones.
    pub async fn list_items(&self, identity: &Identity) -> Result<Vec<VaultItem>> {
        let items = self
            .records
            .list_by_family(&identity.family_id)
            .await
            .map_err(into_persistence)?;
        let total = items.len();

        let visible = self.list_visible_items(identity, items);
        debug!(
            user = %identity.user_id,
            family = %identity.family_id,
            total,
            visible = visible.len(),
            "Listed vault items"
        );
        Ok(visible)
    }

    /// Decrypt the secret of a text item.
    ///
    /// Does not re-check `identity` against the item's family or visibility;
    /// callers are expected to pass ids obtained from `list_items`. Anyone
    /// holding an id can therefore reveal its secret.
    ///
    /// # Errors
    /// - `NotFound` if no item has this id
    /// - `Validation` if the item is a file
    /// - `Decryption` if the stored ciphertext is malformed
    pub async fn reveal_secret(
        &self,
        identity: &Identity,
        item_id: &ItemId,
    ) -> Result<SensitiveString> {
        let item = self
            .records
            .get(item_id)
            .await
            .map_err(into_persistence)?
            .ok_or_else(|| Error::NotFound(format!("Vault item not found: {}", item_id)))?;

        let ciphertext = item.secret_payload().ok_or_else(|| {
            Error::Validation(format!("Vault item {} holds a file, not a secret", item_id))
        })?;

        debug!(
            user = %identity.user_id,
            item = %item_id,
            same_family = item.family_id == identity.family_id,
            "Revealing secret"
        );

        self.cipher.decrypt(ciphertext).map(SensitiveString::new)
    }

    /// Add an item to the caller's family vault.
    ///
    /// # Preconditions
    /// - Caller role can manage the vault
    /// - Non-blank title
    /// - Exactly one of a non-empty secret text or a file
    /// - `Member` visibility names at least one assignee
    ///
    /// # Postconditions
    /// - Text: the record holds ciphertext only
    /// - File: the object is uploaded before the record is inserted; if the
    ///   insert fails the object is removed again
    ///
    /// # Errors
    /// - `Unauthorized`, `Validation` before any write
    /// - `Storage` if the upload fails (no record is created)
    /// - `Persistence` if the insert fails
    pub async fn add_item(
        &self,
        identity: &Identity,
        request: AddItemRequest,
    ) -> Result<CreatedItem> {
        if !identity.can_manage_vault() {
            return Err(Error::Unauthorized(format!(
                "Role '{}' cannot add vault items",
                identity.role
            )));
        }

        let title = request.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }

        let secret_text = request.secret_text.filter(|s| !s.is_empty());
        let content = match (secret_text, request.file) {
            (Some(secret), None) => Content::Secret(secret),
            (None, Some(file)) => Content::File(file),
            (None, None) => {
                return Err(Error::Validation(
                    "Either a secret value or a file is required".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(Error::Validation(
                    "An item holds either a secret value or a file, not both".to_string(),
                ))
            }
        };

        let assigned_to = match request.visibility {
            Visibility::Member => match request.assigned_to {
                Some(users) if !users.is_empty() => Some(users),
                _ => {
                    return Err(Error::Validation(
                        "Member visibility requires at least one assignee".to_string(),
                    ))
                }
            },
            Visibility::Parents | Visibility::Family => None,
        };

        let category = request
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.default_category.clone());

        let created_at = Utc::now();
        let mut uploaded: Option<ObjectPath> = None;

        let payload = match content {
            Content::Secret(secret) => ItemPayload::Text {
                ciphertext: self.cipher.encrypt(&secret),
            },
            Content::File(file) => {
                let path = file_object_path(&identity.family_id, created_at, &file.file_name)?;
                let mime_type = file.effective_content_type().to_string();
                let size = file.data.len();

                self.objects
                    .upload(&path, file.data, &mime_type)
                    .await
                    .map_err(into_storage)?;
                debug!(path = %path, size, "Uploaded vault file");

                uploaded = Some(path.clone());
                ItemPayload::File { path, mime_type }
            }
        };

        let record = NewVaultRecord {
            family_id: identity.family_id.clone(),
            title: title.to_string(),
            category,
            visibility: request.visibility,
            assigned_to,
            payload,
            created_by: identity.user_id.clone(),
            created_at,
        };

        let item = match self.records.insert(record).await {
            Ok(item) => item,
            Err(e) => {
                if let Some(path) = &uploaded {
                    if let Err(cleanup) = self.objects.delete(path).await {
                        warn!(
                            path = %path,
                            error = %cleanup,
                            "Failed to remove uploaded file after record insert failed"
                        );
                    }
                }
                return Err(into_persistence(e));
            }
        };

        info!(
            id = %item.id,
            family = %item.family_id,
            kind = ?item.kind(),
            visibility = %item.visibility,
            "Vault item added"
        );

        Ok(CreatedItem {
            id: item.id.clone(),
            kind: item.kind(),
            file_path: item.file_path().cloned(),
        })
    }

    /// Issue a fresh time-limited read link for a stored file.
    ///
    /// # Errors
    /// - `Storage` if the object does not exist or signing fails
    pub async fn get_file_access_url(&self, file_path: &ObjectPath) -> Result<SignedUrl> {
        let link = self
            .objects
            .signed_url(file_path, self.signed_url_ttl)
            .await
            .map_err(into_storage)?;
        debug!(path = %file_path, expires_at = %link.expires_at, "Issued file access link");
        Ok(link)
    }

    /// Delete an item and its stored file.
    ///
    /// Without `file_path` the file referenced by the record is removed,
    /// whether or not the record is visible to any particular caller.
    /// The record is deleted first. A failure to remove the file afterwards
    /// is logged and reported in the outcome; the delete still succeeds.
    ///
    /// # Errors
    /// - `NotFound` or `Persistence` if the record delete fails; storage is
    ///   left untouched in that case
    pub async fn delete_item(
        &self,
        item_id: &ItemId,
        file_path: Option<&ObjectPath>,
    ) -> Result<DeleteOutcome> {
        let file_path = match file_path {
            Some(path) => Some(path.clone()),
            None => self
                .records
                .get(item_id)
                .await
                .map_err(into_persistence)?
                .and_then(|item| item.file_path().cloned()),
        };

        self.records
            .delete(item_id)
            .await
            .map_err(into_persistence)?;
        info!(id = %item_id, "Vault item deleted");

        let mut outcome = DeleteOutcome {
            item_id: item_id.clone(),
            removed_file: None,
            orphaned_file: None,
        };

        if let Some(path) = &file_path {
            match self.objects.delete(path).await {
                Ok(()) => outcome.removed_file = Some(path.clone()),
                Err(e) => {
                    warn!(
                        id = %item_id,
                        path = %path,
                        error = %e,
                        "Vault file left in storage after its record was deleted"
                    );
                    outcome.orphaned_file = Some(OrphanedFile {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }
}
