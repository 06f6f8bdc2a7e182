//! Core traits for the Pi-hole provider
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsRecordClient`]: List, create and delete Pi-hole local DNS records
//! - [`StateStore`]: Persistent storage of managed resource instances

pub mod dns_client;
pub mod state_store;

pub use dns_client::{DnsClientFactory, DnsRecordClient};
pub use state_store::{ResourceState, StateStore, StateStoreFactory};
