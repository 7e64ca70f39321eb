//! Registry for resolving object store backends by name.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::provider::ObjectStore;
use kinvault_common::{Error, Result};

/// Factory function type for creating object stores.
pub type ObjectStoreFactory = Box<dyn Fn(Value) -> Result<Arc<dyn ObjectStore>> + Send + Sync>;

/// Registry of object store factories.
pub struct ObjectStoreRegistry {
    factories: HashMap<String, ObjectStoreFactory>,
}

impl ObjectStoreRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory.
    ///
    /// # Errors
    /// - Returns `Config` if `name` is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: ObjectStoreFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::Config(format!(
                "Object store '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a store by name and backend configuration.
    ///
    /// # Errors
    /// - Backend not registered
    /// - Configuration invalid for the backend
    pub fn resolve(&self, name: &str, config: Value) -> Result<Arc<dyn ObjectStore>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::Config(format!("Object store '{}' is not registered", name)))?;
        factory(config)
    }

    /// Registered backend names.
    pub fn providers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ObjectStoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in backends.
pub fn create_default_registry() -> ObjectStoreRegistry {
    let mut registry = ObjectStoreRegistry::new();

    registry
        .register(
            "memory",
            Box::new(|_config| Ok(Arc::new(crate::memory::MemoryObjectStore::new()))),
        )
        .expect("Failed to register memory object store");

    registry
        .register(
            "local",
            Box::new(|config| {
                let root = config.get("root").and_then(|v| v.as_str()).ok_or_else(|| {
                    Error::Config("Local object store requires 'root' path".to_string())
                })?;
                Ok(Arc::new(crate::local::LocalObjectStore::new(root)?))
            }),
        )
        .expect("Failed to register local object store");

    registry
}
