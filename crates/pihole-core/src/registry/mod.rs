//! Plugin-based client registry
//!
//! The registry allows DNS record clients and state stores to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Registration
//!
//! Implementations register themselves during initialization:
//!
//! ```rust,ignore
//! // In the pihole-client crate
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_client("pihole", Box::new(PiholeFactory));
//! }
//! ```

use crate::config::{ProviderConfig, StateStoreConfig};
use crate::error::{Error, Result};
use crate::state::{FileStateStoreFactory, MemoryStateStoreFactory};
use crate::traits::{DnsClientFactory, DnsRecordClient, StateStore, StateStoreFactory};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry for client and state store factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS record client factories
    clients: RwLock<HashMap<String, Arc<dyn DnsClientFactory>>>,

    /// Registered state store factories
    state_stores: RwLock<HashMap<String, Arc<dyn StateStoreFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in state stores ("file", "memory")
    pub fn with_builtin_state_stores() -> Self {
        let registry = Self::new();
        registry.register_state_store("file", Box::new(FileStateStoreFactory));
        registry.register_state_store("memory", Box::new(MemoryStateStoreFactory));
        registry
    }

    /// Register a DNS record client factory
    pub fn register_client(&self, name: impl Into<String>, factory: Box<dyn DnsClientFactory>) {
        let mut clients = self
            .clients
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        clients.insert(name.into(), Arc::from(factory));
    }

    /// Register a state store factory
    pub fn register_state_store(
        &self,
        name: impl Into<String>,
        factory: Box<dyn StateStoreFactory>,
    ) {
        let mut stores = self
            .state_stores
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        stores.insert(name.into(), Arc::from(factory));
    }

    /// Create a DNS record client from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsRecordClient>)`: Created client instance
    /// - `Err(Error)`: If the client type is not registered or creation fails
    pub fn create_client(
        &self,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<Box<dyn DnsRecordClient>> {
        let factory = {
            let clients = self
                .clients
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            clients
                .get(name)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown client type: {}", name)))?
        };

        factory.create(config)
    }

    /// Create a state store from configuration
    pub async fn create_state_store(
        &self,
        config: &StateStoreConfig,
    ) -> Result<Box<dyn StateStore>> {
        let store_type = config.type_name();

        // Release the lock before calling async create
        let factory = {
            let stores = self
                .state_stores
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            stores
                .get(store_type)
                .cloned()
                .ok_or_else(|| {
                    Error::config(format!("Unknown state store type: {}", store_type))
                })?
        };

        factory.create(config).await
    }

    /// List all registered client types
    pub fn list_clients(&self) -> Vec<String> {
        let clients = self
            .clients
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = clients.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a client type is registered
    pub fn has_client(&self, name: &str) -> bool {
        let clients = self
            .clients
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        clients.contains_key(name)
    }

    /// Check if a state store type is registered
    pub fn has_state_store(&self, name: &str) -> bool {
        let stores = self
            .state_stores
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        stores.contains_key(name)
    }
}
