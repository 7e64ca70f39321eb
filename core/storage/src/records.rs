//! Relational store trait for the `vault_items` table.

use async_trait::async_trait;

use kinvault_common::{FamilyId, ItemId, NewVaultRecord, Result, VaultItem};

/// Record store collaborator.
///
/// Rejections by the backing store are reported as `Error::Persistence`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend name (e.g. "memory", "json").
    fn name(&self) -> &str;

    /// All items of one family, in store order.
    async fn list_by_family(&self, family_id: &FamilyId) -> Result<Vec<VaultItem>>;

    /// Fetch a single item by id.
    async fn get(&self, id: &ItemId) -> Result<Option<VaultItem>>;

    /// Insert a record; the store assigns the id.
    async fn insert(&self, record: NewVaultRecord) -> Result<VaultItem>;

    /// Delete a record.
    ///
    /// # Errors
    /// - `NotFound` if no record has this id
    async fn delete(&self, id: &ItemId) -> Result<()>;
}
