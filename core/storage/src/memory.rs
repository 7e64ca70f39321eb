//! In-memory backends for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::provider::{ObjectMetadata, ObjectStore};
use crate::records::RecordStore;
use crate::signing::UrlSigner;
use kinvault_common::{Error, FamilyId, ItemId, NewVaultRecord, ObjectPath, Result, VaultItem};

/// Base URL for links issued by the memory bucket.
pub const MEMORY_SIGNING_BASE: &str = "memory://vault_files/object";

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    metadata: ObjectMetadata,
}

/// In-memory object store.
///
/// All data is lost on drop.
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    signer: UrlSigner,
}

impl MemoryObjectStore {
    /// Create an empty store with a random signing secret.
    pub fn new() -> Self {
        Self::with_signer(Self::default_signer())
    }

    /// Create an empty store with a specific signer.
    pub fn with_signer(signer: UrlSigner) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            signer,
        }
    }

    fn default_signer() -> UrlSigner {
        UrlSigner::random(MEMORY_SIGNING_BASE).expect("memory signing base is a valid URL")
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Metadata of a stored object.
    pub async fn metadata(&self, path: &ObjectPath) -> Option<ObjectMetadata> {
        self.objects
            .read()
            .await
            .get(&path.to_string_path())
            .map(|o| o.metadata.clone())
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
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
        let key = path.to_string_path();
        let mut objects = self.objects.write().await;

        if objects.contains_key(&key) {
            return Err(Error::Storage(format!("Object already exists: {}", path)));
        }

        let metadata = ObjectMetadata {
            path: path.clone(),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            uploaded_at: Utc::now(),
            etag: Uuid::new_v4().to_string(),
        };
        objects.insert(
            key,
            StoredObject {
                data,
                metadata: metadata.clone(),
            },
        );

        Ok(metadata)
    }

    async fn download(&self, path: &ObjectPath) -> Result<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&path.to_string_path())
            .map(|o| o.data.clone())
            .ok_or_else(|| Error::Storage(format!("Object not found: {}", path)))
    }

    async fn exists(&self, path: &ObjectPath) -> Result<bool> {
        Ok(self
            .objects
            .read()
            .await
            .contains_key(&path.to_string_path()))
    }

    async fn delete(&self, path: &ObjectPath) -> Result<()> {
        self.objects
            .write()
            .await
            .remove(&path.to_string_path())
            .map(|_| ())
            .ok_or_else(|| Error::Storage(format!("Object not found: {}", path)))
    }
}

/// In-memory record store.
///
/// Preserves insertion order, which is the store order `list_by_family`
/// reports.
#[derive(Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Vec<VaultItem>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with items, e.g. fixtures.
    pub fn with_items(items: Vec<VaultItem>) -> Self {
        Self {
            rows: RwLock::new(items),
        }
    }

    /// Number of rows across all families.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_by_family(&self, family_id: &FamilyId) -> Result<Vec<VaultItem>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|item| &item.family_id == family_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &ItemId) -> Result<Option<VaultItem>> {
        Ok(self.rows.read().await.iter().find(|item| &item.id == id).cloned())
    }

    async fn insert(&self, record: NewVaultRecord) -> Result<VaultItem> {
        let id = ItemId::new(Uuid::new_v4().to_string())?;
        let item = record.into_item(id);
        self.rows.write().await.push(item.clone());
        Ok(item)
    }

    async fn delete(&self, id: &ItemId) -> Result<()> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|item| &item.id != id);
        if rows.len() == before {
            return Err(Error::NotFound(format!("Vault item not found: {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use kinvault_common::{ItemPayload, UserId, Visibility};
    use std::time::Duration;

    fn path(s: &str) -> ObjectPath {
        ObjectPath::parse(s).unwrap()
    }

    fn record(family: &str, title: &str) -> NewVaultRecord {
        NewVaultRecord {
            family_id: FamilyId::new(family).unwrap(),
            title: title.to_string(),
            category: "other".to_string(),
            visibility: Visibility::Family,
            assigned_to: None,
            payload: ItemPayload::Text {
                ciphertext: "AAEC".to_string(),
            },
            created_by: UserId::new("u1").unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upload_download() {
        let store = MemoryObjectStore::new();
        let p = path("fam-1/1-note.txt");

        let meta = store.upload(&p, b"hello".to_vec(), "text/plain").await.unwrap();
        assert_eq!(meta.size, 5);
        assert_eq!(meta.content_type, "text/plain");
        assert_eq!(store.download(&p).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_upload_existing_fails() {
        let store = MemoryObjectStore::new();
        let p = path("fam-1/1-note.txt");

        store.upload(&p, vec![1], "text/plain").await.unwrap();
        let result = store.upload(&p, vec![2], "text/plain").await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryObjectStore::new();
        let p = path("fam-1/1-note.txt");

        store.upload(&p, vec![1, 2, 3], "text/plain").await.unwrap();
        assert!(store.exists(&p).await.unwrap());

        store.delete(&p).await.unwrap();
        assert!(!store.exists(&p).await.unwrap());
        assert!(matches!(store.delete(&p).await, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_signed_url_missing_object_fails() {
        let store = MemoryObjectStore::new();
        let result = store
            .signed_url(&path("fam-1/none.pdf"), Duration::from_secs(3600))
            .await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_signed_url_grants_read_until_expiry() {
        let store = MemoryObjectStore::new();
        let p = path("fam-1/1-scan.png");
        store.upload(&p, vec![9, 9], "image/png").await.unwrap();

        let link = store.signed_url(&p, Duration::from_secs(3600)).await.unwrap();
        assert_eq!(store.open_signed(&link.url).await.unwrap(), vec![9, 9]);

        let after = link.expires_at + ChronoDuration::seconds(1);
        assert!(store.open_signed_at(&link.url, after).await.is_err());
    }

    #[tokio::test]
    async fn test_records_preserve_store_order() {
        let store = MemoryRecordStore::new();
        store.insert(record("fam-1", "a")).await.unwrap();
        store.insert(record("fam-2", "b")).await.unwrap();
        store.insert(record("fam-1", "c")).await.unwrap();

        let items = store
            .list_by_family(&FamilyId::new("fam-1").unwrap())
            .await
            .unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_record_get_and_delete() {
        let store = MemoryRecordStore::new();
        let item = store.insert(record("fam-1", "a")).await.unwrap();

        assert_eq!(store.get(&item.id).await.unwrap(), Some(item.clone()));

        store.delete(&item.id).await.unwrap();
        assert!(store.get(&item.id).await.unwrap().is_none());
        assert!(matches!(store.delete(&item.id).await, Err(Error::NotFound(_))));
    }
}
