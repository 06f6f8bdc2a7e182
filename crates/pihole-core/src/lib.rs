// # pihole-core
//
// Core library for the Pi-hole local DNS record provider.
//
// ## Architecture Overview
//
// This library provides everything except the HTTP plumbing:
// - **DnsRecordClient**: Trait for listing, creating and deleting local DNS records
// - **Resource**: Trait for a provider resource (create/read/delete/import handlers)
// - **PiholeProvider**: Provider definition (configuration schema + resources)
// - **StateStore**: Trait for persisting managed resource instances
// - **Lifecycle**: Drives resources against a client and a state store
// - **ProviderRegistry**: Plugin-based registry for client and state store factories
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Resource logic is separate from HTTP implementations
// 2. **Plugin-Based**: Clients are registered dynamically, no hard-coded if-else
// 3. **Library-First**: All lifecycle functionality can be used as a library
// 4. **Diagnostics over panics**: Resource handlers report failures as diagnostics

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod provider;
pub mod record;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{AuthMode, ProviderConfig, StateStoreConfig};
pub use error::{Error, Result};
pub use lifecycle::{ApplyOutcome, Lifecycle};
pub use provider::PiholeProvider;
pub use record::{DnsRecord, DnsRecordList};
pub use registry::ProviderRegistry;
pub use resource::{DnsRecordResource, Resource};
pub use schema::{Diagnostic, Diagnostics, ResourceData, Severity};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{DnsRecordClient, StateStore};
