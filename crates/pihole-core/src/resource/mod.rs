// # Resources
//
// A resource binds a schema to create/read/delete/import handlers. Handlers
// receive the instance's `ResourceData` and the configured client, mutate
// the data in place (ID and attributes) and report problems as
// `Diagnostics`. Clearing the ID means the remote object is gone.

pub mod dns_record;

pub use dns_record::DnsRecordResource;

use async_trait::async_trait;

use crate::record::parse_record_id;
use crate::schema::{Diagnostics, ResourceData, ResourceSchema};
use crate::traits::DnsRecordClient;

/// Trait for provider resources
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name (e.g. "pihole_dns_record")
    fn type_name(&self) -> &'static str;

    /// Resource schema
    fn schema(&self) -> ResourceSchema;

    /// Create the remote object and set the ID
    async fn create(&self, data: &mut ResourceData, client: &dyn DnsRecordClient) -> Diagnostics;

    /// Refresh attributes from the remote object, clearing the ID if it is gone
    async fn read(&self, data: &mut ResourceData, client: &dyn DnsRecordClient) -> Diagnostics;

    /// Delete the remote object and clear the ID
    async fn delete(&self, data: &mut ResourceData, client: &dyn DnsRecordClient) -> Diagnostics;

    /// Prepare resource data for import
    ///
    /// The default keeps the ID as-is; `read` then fills in the attributes.
    async fn import(&self, data: &mut ResourceData) -> Diagnostics {
        if data.is_gone() {
            return Diagnostics::error("Import requires a non-empty ID");
        }
        Diagnostics::new()
    }
}

/// Parse a record ID from resource data, as diagnostics on failure
pub(crate) fn record_id_parts(data: &ResourceData) -> Result<(String, String), Diagnostics> {
    let id = data
        .id()
        .ok_or_else(|| Diagnostics::error("Resource has no ID"))?;
    parse_record_id(id).map_err(Diagnostics::from)
}
