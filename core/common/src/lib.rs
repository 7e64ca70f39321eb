//! Common types shared across the KinVault crates.
//!
//! Identifiers, the vault item model, the caller identity handed over by the
//! authentication collaborator, and the error type every vault operation
//! returns.

pub mod error;
pub mod identity;
pub mod item;
pub mod types;

pub use error::{Error, Result};
pub use identity::{Identity, Role};
pub use item::{ItemKind, ItemPayload, NewVaultRecord, VaultItem, Visibility};
pub use types::{FamilyId, ItemId, ObjectPath, SensitiveString, UserId};
