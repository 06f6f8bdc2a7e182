// # State Store Trait
//
// Defines the interface for persisting managed resource instances.
//
// ## Purpose
//
// The state store remembers, per resource address (e.g.
// `pihole_dns_record.nas`), the resource ID and the attributes last read
// from Pi-hole. The lifecycle uses it to decide between create, refresh and
// replace.
//
// ## Implementations
//
// - Memory: `MemoryStateStore`
// - File: `FileStateStore` (JSON, atomic writes)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::ResourceData;

/// State of one managed resource instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type name (e.g. "pihole_dns_record")
    pub resource_type: String,
    /// Resource ID assigned on create/import
    pub id: String,
    /// Attributes as last written or read
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Timestamp of the last write
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl ResourceState {
    /// Capture the state of a resource after a successful operation
    ///
    /// Returns `None` when the resource has no ID (it is gone).
    pub fn from_data(resource_type: impl Into<String>, data: &ResourceData) -> Option<Self> {
        let id = data.id()?.to_string();
        Some(Self {
            resource_type: resource_type.into(),
            id,
            attributes: data.attributes.clone(),
            last_updated: chrono::Utc::now(),
        })
    }

    /// Turn the stored state back into resource data
    pub fn to_data(&self) -> ResourceData {
        ResourceData {
            id: Some(self.id.clone()),
            attributes: self.attributes.clone(),
        }
    }
}

/// Trait for state store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the state for a resource address
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ResourceState))`: The stored state
    /// - `Ok(None)`: Address not managed
    /// - `Err(Error)`: Storage error
    async fn get(&self, address: &str) -> Result<Option<ResourceState>, crate::Error>;

    /// Create or replace the state for a resource address
    async fn put(&self, address: &str, state: &ResourceState) -> Result<(), crate::Error>;

    /// Remove a resource address (no-op if absent)
    async fn remove(&self, address: &str) -> Result<(), crate::Error>;

    /// List all managed addresses, sorted
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}

/// Helper trait for constructing state stores from configuration
#[async_trait]
pub trait StateStoreFactory: Send + Sync {
    /// Create a StateStore instance from configuration
    async fn create(
        &self,
        config: &crate::config::StateStoreConfig,
    ) -> Result<Box<dyn StateStore>, crate::Error>;
}
