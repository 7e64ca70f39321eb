//! Backend collaborators for the family vault.
//!
//! This module provides trait-based interfaces for the two remote services
//! the vault talks to, plus concrete backends:
//! - `ObjectStore`: the `vault_files` bucket (upload, delete, signed URLs)
//! - `RecordStore`: the `vault_items` table (select, insert, delete)
//!
//! # Design Principles
//! - Provider isolation: no backend-specific logic in the vault module
//! - Async operations: every call may suspend on a network round trip
//! - Unified error semantics: object failures are `Storage`, record failures are `Persistence`

pub mod json;
pub mod local;
pub mod memory;
pub mod provider;
pub mod records;
pub mod registry;
pub mod signing;

pub use json::JsonRecordStore;
pub use local::LocalObjectStore;
pub use memory::{MemoryObjectStore, MemoryRecordStore};
pub use provider::{ObjectMetadata, ObjectStore, SignedUrl};
pub use records::RecordStore;
pub use registry::{create_default_registry, ObjectStoreFactory, ObjectStoreRegistry};
pub use signing::UrlSigner;
