//! Local DNS record types
//!
//! A Pi-hole local DNS record is a flat (domain, IP) pair. Resources identify
//! a record by the ID `"{domain}_{ip}"`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Separator between domain and IP in a resource ID
const ID_SEPARATOR: char = '_';

/// A single local DNS record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Record domain (e.g. "nas.lan")
    pub domain: String,
    /// IP address the domain resolves to
    pub ip: String,
}

/// List of local DNS records as returned by Pi-hole
pub type DnsRecordList = Vec<DnsRecord>;

impl DnsRecord {
    /// Create a new record
    pub fn new(domain: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ip: ip.into(),
        }
    }

    /// Check whether this record belongs to `domain`
    ///
    /// Pi-hole stores domains lowercased, so the query is lowercased before
    /// comparison.
    pub fn matches_domain(&self, domain: &str) -> bool {
        self.domain == domain.to_lowercase()
    }

    /// Resource ID for this record
    pub fn id(&self) -> String {
        format!("{}{}{}", self.domain, ID_SEPARATOR, self.ip)
    }
}

impl fmt::Display for DnsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.domain, self.ip)
    }
}

/// Split a resource ID into its (domain, ip) parts
///
/// IPs never contain `_`, so the last separator is the boundary.
pub fn parse_record_id(id: &str) -> Result<(String, String)> {
    let (domain, ip) = id.rsplit_once(ID_SEPARATOR).ok_or_else(|| {
        Error::invalid_input(format!(
            "Invalid record ID '{}': expected the form <domain>_<ip>",
            id
        ))
    })?;

    if domain.is_empty() || ip.is_empty() {
        return Err(Error::invalid_input(format!(
            "Invalid record ID '{}': domain and ip must both be non-empty",
            id
        )));
    }

    Ok((domain.to_string(), ip.to_string()))
}

/// Normalize a domain for comparison
pub fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id() {
        let record = DnsRecord::new("nas.lan", "192.168.1.10");
        assert_eq!(record.id(), "nas.lan_192.168.1.10");
    }

    #[test]
    fn test_parse_record_id_uses_last_separator() {
        let (domain, ip) = parse_record_id("_srv.my_host.lan_10.0.0.1").unwrap();
        assert_eq!(domain, "_srv.my_host.lan");
        assert_eq!(ip, "10.0.0.1");
    }

    #[test]
    fn test_parse_record_id_rejects_malformed() {
        assert!(parse_record_id("nas.lan").is_err());
        assert!(parse_record_id("_10.0.0.1").is_err());
        assert!(parse_record_id("nas.lan_").is_err());
    }

    #[test]
    fn test_matches_domain_is_case_insensitive() {
        let record = DnsRecord::new("nas.lan", "10.0.0.1");
        assert!(record.matches_domain("NAS.lan"));
        assert!(!record.matches_domain("nas.home"));
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain(" Router.LAN. "), "router.lan");
        assert_eq!(normalize_domain("router.lan"), "router.lan");
    }
}
