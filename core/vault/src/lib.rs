//! Vault engine for KinVault.
//!
//! This module provides:
//! - Role and visibility based access to family vault items
//! - Text secret encryption and reveal
//! - File upload, signed link and delete lifecycle
//! - Deployment configuration and the authentication seam
//!
//! # Architecture
//! `VaultAccessManager` sits between the application screens and the
//! record/object store collaborators. It holds no state of its own.

pub mod config;
pub mod manager;
pub mod paths;
pub mod policy;
pub mod request;
pub mod session;

pub use config::{ObjectStoreConfig, VaultConfig};
pub use manager::VaultAccessManager;
pub use paths::{file_object_path, sanitize_file_name};
pub use policy::{filter_visible, is_visible};
pub use request::{AddItemRequest, CreatedItem, DeleteOutcome, FileUpload, OrphanedFile};
pub use session::{IdentityProvider, SessionToken, StaticIdentityProvider};
