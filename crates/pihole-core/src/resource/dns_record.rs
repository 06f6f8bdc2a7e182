// # pihole_dns_record
//
// Manages a single Pi-hole local DNS record. Both attributes force
// replacement, so there is no update handler: a change is delete + create.
//
// The resource ID is "{domain}_{ip}".

use async_trait::async_trait;
use tracing::{debug, info};

use super::{Resource, record_id_parts};
use crate::record::DnsRecord;
use crate::schema::{Attribute, Diagnostics, ResourceData, ResourceSchema};
use crate::traits::DnsRecordClient;

/// Resource type name
pub const DNS_RECORD_TYPE: &str = "pihole_dns_record";

/// Local DNS record resource
#[derive(Debug, Default, Clone, Copy)]
pub struct DnsRecordResource;

impl DnsRecordResource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Resource for DnsRecordResource {
    fn type_name(&self) -> &'static str {
        DNS_RECORD_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("Manages a Pi-hole DNS record")
            .with_attribute(
                "domain",
                Attribute::required_string()
                    .with_description("DNS record domain")
                    .case_insensitive()
                    .force_new(),
            )
            .with_attribute(
                "ip",
                Attribute::required_string()
                    .with_description("IP address to route traffic to from the DNS record domain")
                    .force_new(),
            )
            .importable()
    }

    async fn create(&self, data: &mut ResourceData, client: &dyn DnsRecordClient) -> Diagnostics {
        let (Some(domain), Some(ip)) = (data.get_str("domain"), data.get_str("ip")) else {
            return Diagnostics::error("Both \"domain\" and \"ip\" must be set");
        };
        let record = DnsRecord::new(domain, ip);

        if let Err(e) = client.create_record(&record).await {
            return Diagnostics::from_err(&e);
        }

        info!("Created DNS record {}", record);
        data.set_id(record.id());
        Diagnostics::new()
    }

    async fn read(&self, data: &mut ResourceData, client: &dyn DnsRecordClient) -> Diagnostics {
        let (domain, ip) = match record_id_parts(data) {
            Ok(parts) => parts,
            Err(diags) => return diags,
        };

        let records = match client.get_record_list(&domain).await {
            Ok(records) => records,
            Err(e) if e.is_not_found() => {
                debug!("No DNS records left for {}, marking resource as gone", domain);
                data.clear_id();
                return Diagnostics::new();
            }
            Err(e) => return Diagnostics::from_err(&e),
        };

        let Some(record) = records.into_iter().find(|r| r.ip == ip) else {
            debug!("DNS record {} -> {} no longer exists", domain, ip);
            data.clear_id();
            return Diagnostics::new();
        };

        data.set("domain", record.domain);
        data.set("ip", record.ip);
        Diagnostics::new()
    }

    async fn delete(&self, data: &mut ResourceData, client: &dyn DnsRecordClient) -> Diagnostics {
        let (domain, ip) = match record_id_parts(data) {
            Ok(parts) => parts,
            Err(diags) => return diags,
        };
        let record = DnsRecord::new(domain, ip);

        match client.delete_exact(&record).await {
            Ok(()) => info!("Deleted DNS record {}", record),
            Err(e) if e.is_not_found() => debug!("DNS record {} was already deleted", record),
            Err(e) => return Diagnostics::from_err(&e),
        }

        data.clear_id();
        Diagnostics::new()
    }

    async fn import(&self, data: &mut ResourceData) -> Diagnostics {
        match record_id_parts(data) {
            Ok(_) => Diagnostics::new(),
            Err(diags) => diags,
        }
    }
}
