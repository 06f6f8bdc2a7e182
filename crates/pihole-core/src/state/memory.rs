// # Memory State Store
//
// In-memory implementation of StateStore.
//
// Nothing survives a restart: every resource is unmanaged again on the next
// run. Useful for tests and one-shot invocations.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StateStoreConfig;
use crate::traits::state_store::{ResourceState, StateStore, StateStoreFactory};

/// In-memory state store implementation
///
/// # Example
///
/// ```rust,no_run
/// use pihole_core::state::MemoryStateStore;
/// use pihole_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///     assert!(store.get("pihole_dns_record.nas").await?.is_none());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<String, ResourceState>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of resources in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, address: &str) -> Result<Option<ResourceState>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(address).cloned())
    }

    async fn put(&self, address: &str, state: &ResourceState) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(address.to_string(), state.clone());
        Ok(())
    }

    async fn remove(&self, address: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(address);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        let mut addresses: Vec<String> = guard.keys().cloned().collect();
        addresses.sort();
        Ok(addresses)
    }

    async fn flush(&self) -> Result<(), Error> {
        // No-op for memory store (everything is already "persisted")
        Ok(())
    }
}

/// Factory for the "memory" state store type
pub struct MemoryStateStoreFactory;

#[async_trait]
impl StateStoreFactory for MemoryStateStoreFactory {
    async fn create(&self, config: &StateStoreConfig) -> Result<Box<dyn StateStore>, Error> {
        match config {
            StateStoreConfig::Memory => Ok(Box::new(MemoryStateStore::new())),
            _ => Err(Error::config("Invalid config for memory state store")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ResourceData;

    fn state(id: &str) -> ResourceState {
        let data = ResourceData::with_id(id).with("domain", "nas.lan");
        ResourceState::from_data("pihole_dns_record", &data).unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStateStore::new();
        assert!(store.is_empty().await);

        store.put("pihole_dns_record.nas", &state("nas.lan_10.0.0.2")).await.unwrap();
        assert_eq!(store.len().await, 1);

        let retrieved = store.get("pihole_dns_record.nas").await.unwrap().unwrap();
        assert_eq!(retrieved.id, "nas.lan_10.0.0.2");

        store.remove("pihole_dns_record.nas").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_store_list_is_sorted() {
        let store = MemoryStateStore::new();
        store.put("pihole_dns_record.b", &state("b.lan_10.0.0.2")).await.unwrap();
        store.put("pihole_dns_record.a", &state("a.lan_10.0.0.1")).await.unwrap();

        assert_eq!(
            store.list().await.unwrap(),
            vec!["pihole_dns_record.a", "pihole_dns_record.b"]
        );
    }
}
