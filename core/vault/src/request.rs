//! Inputs and outputs of vault operations.

use std::collections::BTreeSet;

use kinvault_common::{ItemId, ItemKind, ObjectPath, UserId, Visibility};

/// Content type recorded when the caller declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw file attached to a new item.
#[derive(Clone)]
pub struct FileUpload {
    /// Original file name; sanitized before it becomes part of a path.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Declared content type, or the default when blank.
    pub fn effective_content_type(&self) -> &str {
        let declared = self.content_type.trim();
        if declared.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            declared
        }
    }
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Request to add an item to the family vault.
#[derive(Clone)]
pub struct AddItemRequest {
    pub title: String,
    pub category: Option<String>,
    pub secret_text: Option<String>,
    pub file: Option<FileUpload>,
    pub visibility: Visibility,
    pub assigned_to: Option<BTreeSet<UserId>>,
}

impl AddItemRequest {
    /// Text secret item.
    pub fn text(
        title: impl Into<String>,
        secret: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            title: title.into(),
            category: None,
            secret_text: Some(secret.into()),
            file: None,
            visibility,
            assigned_to: None,
        }
    }

    /// File item.
    pub fn file(title: impl Into<String>, file: FileUpload, visibility: Visibility) -> Self {
        Self {
            title: title.into(),
            category: None,
            secret_text: None,
            file: Some(file),
            visibility,
            assigned_to: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_assignees(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.assigned_to = Some(users.into_iter().collect());
        self
    }
}

impl std::fmt::Debug for AddItemRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddItemRequest")
            .field("title", &self.title)
            .field("category", &self.category)
            .field("secret_text", &self.secret_text.as_ref().map(|_| "[REDACTED]"))
            .field("file", &self.file)
            .field("visibility", &self.visibility)
            .field("assigned_to", &self.assigned_to)
            .finish()
    }
}

/// Reference to a newly created item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub file_path: Option<ObjectPath>,
}

/// File left behind after its record was deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedFile {
    pub path: ObjectPath,
    pub error: String,
}

/// Result of a delete.
///
/// The record is gone whenever a `DeleteOutcome` is returned. File cleanup
/// is best effort and reported in `orphaned_file` when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub item_id: ItemId,
    pub removed_file: Option<ObjectPath>,
    pub orphaned_file: Option<OrphanedFile>,
}

impl DeleteOutcome {
    /// Whether both the record and any referenced file are gone.
    pub fn is_complete(&self) -> bool {
        self.orphaned_file.is_none()
    }
}
