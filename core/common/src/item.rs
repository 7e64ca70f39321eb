//! Vault item records as stored in the `vault_items` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::types::{FamilyId, ItemId, ObjectPath, UserId};

/// Payload shape of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Text,
    File,
}

/// Who may see an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Owners and admins only.
    Parents,
    /// Every member of the family.
    Family,
    /// Only the members listed in `assigned_to`.
    Member,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Parents => "parents",
            Visibility::Family => "family",
            Visibility::Member => "member",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parents" => Ok(Visibility::Parents),
            "family" => Ok(Visibility::Family),
            "member" => Ok(Visibility::Member),
            other => Err(crate::Error::Validation(format!(
                "Unknown visibility: {}",
                other
            ))),
        }
    }
}

/// Stored payload. Exactly one shape per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemPayload {
    /// Base64 ciphertext of the secret text. Never plaintext.
    Text { ciphertext: String },
    /// Reference to an object in the vault bucket.
    File { path: ObjectPath, mime_type: String },
}

impl ItemPayload {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemPayload::Text { .. } => ItemKind::Text,
            ItemPayload::File { .. } => ItemKind::File,
        }
    }
}

/// Record to insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVaultRecord {
    pub family_id: FamilyId,
    pub title: String,
    pub category: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<BTreeSet<UserId>>,
    pub payload: ItemPayload,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl NewVaultRecord {
    /// Attach the store-generated id.
    pub fn into_item(self, id: ItemId) -> VaultItem {
        VaultItem {
            id,
            family_id: self.family_id,
            title: self.title,
            category: self.category,
            visibility: self.visibility,
            assigned_to: self.assigned_to,
            payload: self.payload,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// A stored vault item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultItem {
    pub id: ItemId,
    pub family_id: FamilyId,
    pub title: String,
    pub category: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<BTreeSet<UserId>>,
    pub payload: ItemPayload,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl VaultItem {
    pub fn kind(&self) -> ItemKind {
        self.payload.kind()
    }

    /// Whether `user` is listed in `assigned_to`.
    pub fn is_assigned_to(&self, user: &UserId) -> bool {
        self.assigned_to
            .as_ref()
            .is_some_and(|assigned| assigned.contains(user))
    }

    /// Object path for file items.
    pub fn file_path(&self) -> Option<&ObjectPath> {
        match &self.payload {
            ItemPayload::File { path, .. } => Some(path),
            ItemPayload::Text { .. } => None,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match &self.payload {
            ItemPayload::File { mime_type, .. } => Some(mime_type),
            ItemPayload::Text { .. } => None,
        }
    }

    /// Stored ciphertext for text items.
    pub fn secret_payload(&self) -> Option<&str> {
        match &self.payload {
            ItemPayload::Text { ciphertext } => Some(ciphertext),
            ItemPayload::File { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(payload: ItemPayload) -> NewVaultRecord {
        NewVaultRecord {
            family_id: FamilyId::new("fam-1").unwrap(),
            title: "Router".to_string(),
            category: "password".to_string(),
            visibility: Visibility::Member,
            assigned_to: Some([UserId::new("u2").unwrap()].into_iter().collect()),
            payload,
            created_by: UserId::new("u1").unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_payload_accessors() {
        let text = record(ItemPayload::Text {
            ciphertext: "AAEC".to_string(),
        })
        .into_item(ItemId::new("i1").unwrap());
        assert_eq!(text.kind(), ItemKind::Text);
        assert_eq!(text.secret_payload(), Some("AAEC"));
        assert!(text.file_path().is_none());

        let file = record(ItemPayload::File {
            path: ObjectPath::parse("fam-1/1-a.pdf").unwrap(),
            mime_type: "application/pdf".to_string(),
        })
        .into_item(ItemId::new("i2").unwrap());
        assert_eq!(file.kind(), ItemKind::File);
        assert_eq!(file.mime_type(), Some("application/pdf"));
        assert!(file.secret_payload().is_none());
    }

    #[test]
    fn test_assignment_lookup() {
        let item = record(ItemPayload::Text {
            ciphertext: String::new(),
        })
        .into_item(ItemId::new("i1").unwrap());
        assert!(item.is_assigned_to(&UserId::new("u2").unwrap()));
        assert!(!item.is_assigned_to(&UserId::new("u3").unwrap()));
    }

    #[test]
    fn test_item_serialization() {
        let item = record(ItemPayload::File {
            path: ObjectPath::parse("fam-1/1-a.pdf").unwrap(),
            mime_type: "application/pdf".to_string(),
        })
        .into_item(ItemId::new("i2").unwrap());

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["visibility"], "member");
        assert_eq!(json["payload"]["kind"], "file");
        assert_eq!(json["payload"]["path"], "fam-1/1-a.pdf");

        let back: VaultItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!("Parents".parse::<Visibility>().unwrap(), Visibility::Parents);
        assert!("everyone".parse::<Visibility>().is_err());
    }
}
