//! Record store persisted as a single JSON file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::records::RecordStore;
use kinvault_common::{Error, FamilyId, ItemId, NewVaultRecord, Result, VaultItem};

#[derive(Debug, Default, Serialize, Deserialize)]
struct TableFile {
    items: Vec<VaultItem>,
}

/// `vault_items` table kept in one JSON document.
///
/// Writes go to a temporary file that is renamed over the table, so a crash
/// leaves either the old or the new table. The mutex serializes writers
/// within one process.
pub struct JsonRecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonRecordStore {
    /// Open a table file; it is created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<TableFile> {
        if !fs::try_exists(&self.path)
            .await
            .map_err(|e| Error::Persistence(format!("Cannot stat table: {}", e)))?
        {
            return Ok(TableFile::default());
        }
        let bytes = fs::read(&self.path)
            .await
            .map_err(|e| Error::Persistence(format!("Cannot read table: {}", e)))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            Error::Persistence(format!("Corrupt table {}: {}", self.path.display(), e))
        })
    }

    async fn save(&self, table: &TableFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::Persistence(format!("Cannot create table dir: {}", e)))?;
            }
        }

        let bytes = serde_json::to_vec_pretty(table)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)
            .await
            .map_err(|e| Error::Persistence(format!("Cannot write table: {}", e)))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Persistence(format!("Cannot replace table: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn list_by_family(&self, family_id: &FamilyId) -> Result<Vec<VaultItem>> {
        let table = self.load().await?;
        Ok(table
            .items
            .into_iter()
            .filter(|item| &item.family_id == family_id)
            .collect())
    }

    async fn get(&self, id: &ItemId) -> Result<Option<VaultItem>> {
        let table = self.load().await?;
        Ok(table.items.into_iter().find(|item| &item.id == id))
    }

    async fn insert(&self, record: NewVaultRecord) -> Result<VaultItem> {
        let _guard = self.lock.lock().await;
        let mut table = self.load().await?;

        let item = record.into_item(ItemId::new(Uuid::new_v4().to_string())?);
        table.items.push(item.clone());
        self.save(&table).await?;

        debug!(id = %item.id, family = %item.family_id, "Inserted vault record");
        Ok(item)
    }

    async fn delete(&self, id: &ItemId) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut table = self.load().await?;

        let before = table.items.len();
        table.items.retain(|item| &item.id != id);
        if table.items.len() == before {
            return Err(Error::NotFound(format!("Vault item not found: {}", id)));
        }
        self.save(&table).await
    }
}
