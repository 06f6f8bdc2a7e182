// # DNS Record Client Trait
//
// Defines the interface for managing Pi-hole local DNS records.
//
// ## Implementations
//
// - Pi-hole HTTP client: `pihole-client` crate (token API or admin session)
//
// ## Usage
//
// ```rust,ignore
// use pihole_core::{DnsRecord, DnsRecordClient};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let client = /* DnsRecordClient implementation */;
//
//     client.create_record(&DnsRecord::new("nas.lan", "192.168.1.10")).await?;
//     let records = client.get_record_list("nas.lan").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::config::{AuthMode, ProviderConfig};
use crate::record::{DnsRecord, DnsRecordList};

/// Trait for Pi-hole local DNS record clients
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Errors
///
/// Lookups that find nothing return [`crate::Error::NotFound`] so that
/// resource handlers can tell a vanished record apart from a failed request.
/// Implementations do not retry; a failed request is returned as-is.
#[async_trait]
pub trait DnsRecordClient: Send + Sync {
    /// List every custom DNS record configured in Pi-hole
    async fn list_records(&self) -> Result<DnsRecordList, crate::Error>;

    /// Create a record
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The created record
    /// - `Err(Error)`: Request failed, or Pi-hole refused the record (the
    ///   error carries Pi-hole's message)
    async fn create_record(&self, record: &DnsRecord) -> Result<DnsRecord, crate::Error>;

    /// Get the first record for a domain
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The first matching record
    /// - `Err(Error::NotFound)`: No record for this domain
    async fn get_record(&self, domain: &str) -> Result<DnsRecord, crate::Error>;

    /// Get all records for a domain
    ///
    /// Matching is case-insensitive.
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecordList)`: At least one matching record
    /// - `Err(Error::NotFound)`: No record for this domain
    async fn get_record_list(&self, domain: &str) -> Result<DnsRecordList, crate::Error>;

    /// Delete every record for a domain
    async fn delete_record(&self, domain: &str) -> Result<(), crate::Error>;

    /// Delete exactly one (domain, ip) pair
    async fn delete_exact(&self, record: &DnsRecord) -> Result<(), crate::Error>;

    /// Authentication path used by this client
    fn auth_mode(&self) -> AuthMode;

    /// Get the client name (for logging/debugging)
    fn client_name(&self) -> &'static str;
}

/// Helper trait for constructing clients from configuration
pub trait DnsClientFactory: Send + Sync {
    /// Create a DnsRecordClient instance from configuration
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsRecordClient>, crate::Error>;
}
