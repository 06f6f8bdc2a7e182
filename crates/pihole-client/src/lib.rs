// # Pi-hole Client
//
// This crate provides the HTTP implementation of `DnsRecordClient` for
// Pi-hole local DNS records.
//
// ## Authentication Paths
//
// - **API token** (`api` module): `/admin/api.php?customdns`, token passed as `auth`
// - **Admin session** (`session` module): password login, then form POSTs to
//   `/admin/scripts/pi-hole/php/customdns.php` with the session cookie and CSRF token
//
// The path is chosen once, at construction: the token wins when both
// credentials are configured.
//
// ## Constraints
//
// - One HTTP request per Pi-hole action; no retries or backoff
// - HTTP timeout of 30 seconds
// - Password, token, session id and CSRF token never appear in logs
// - The session path does not follow redirects; login redirects are handled
//   by hand so the session cookie is kept

mod api;
mod response;
mod session;

use async_trait::async_trait;
use pihole_core::config::{AuthMode, ProviderConfig};
use pihole_core::provider::PIHOLE_CLIENT;
use pihole_core::traits::{DnsClientFactory, DnsRecordClient};
use pihole_core::{DnsRecord, DnsRecordList, Error, ProviderRegistry, Result};
use std::fmt;
use std::time::Duration;

use api::TokenApi;
use session::SessionAuth;

/// Default HTTP timeout for requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent
const DEFAULT_USER_AGENT: &str = concat!("pihole-dns/", env!("CARGO_PKG_VERSION"));

/// Authentication path
enum Auth {
    Token(TokenApi),
    Session(SessionAuth),
}

/// Pi-hole local DNS record client
pub struct PiholeClient {
    base_url: String,
    http: reqwest::Client,
    auth: Auth,
}

// Custom Debug implementation that hides credentials
impl fmt::Debug for PiholeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiholeClient")
            .field("base_url", &self.base_url)
            .field("auth_mode", &self.auth_mode())
            .field("credentials", &"<REDACTED>")
            .finish()
    }
}

impl PiholeClient {
    /// Create a client from provider configuration
    ///
    /// # Errors
    ///
    /// - `Error::Config`: invalid configuration, unreadable or invalid CA file
    /// - `Error::Http`: the HTTP client could not be built
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));

        if let Some(ca_file) = config.ca_file.as_deref().filter(|p| !p.is_empty()) {
            let pem = std::fs::read(ca_file).map_err(|e| {
                Error::config(format!("Failed to read CA file {}: {}", ca_file, e))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                Error::config(format!("Invalid CA certificate in {}: {}", ca_file, e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        // The session path reads the cookie off the login redirect itself
        if config.auth_mode() == AuthMode::Session {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }

        let http = builder
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let auth = match config.auth_mode() {
            AuthMode::Token => Auth::Token(TokenApi::new(
                config.api_token.clone().unwrap_or_default(),
            )),
            AuthMode::Session => Auth::Session(SessionAuth::new(
                config.password.clone().unwrap_or_default(),
            )),
        };

        Ok(Self {
            base_url: config.base_url().to_string(),
            http,
            auth,
        })
    }

    async fn fetch_records(&self) -> Result<DnsRecordList> {
        match &self.auth {
            Auth::Token(api) => api.list(&self.http, &self.base_url).await,
            Auth::Session(session) => session.list(&self.http, &self.base_url).await,
        }
    }

    async fn add_record(&self, record: &DnsRecord) -> Result<()> {
        match &self.auth {
            Auth::Token(api) => api.add(&self.http, &self.base_url, record).await,
            Auth::Session(session) => session.add(&self.http, &self.base_url, record).await,
        }
    }

    async fn remove_record(&self, record: &DnsRecord) -> Result<()> {
        match &self.auth {
            Auth::Token(api) => api.delete(&self.http, &self.base_url, record).await,
            Auth::Session(session) => session.delete(&self.http, &self.base_url, record).await,
        }
    }
}

#[async_trait]
impl DnsRecordClient for PiholeClient {
    async fn list_records(&self) -> Result<DnsRecordList> {
        let records = self.fetch_records().await?;
        tracing::debug!("Pi-hole returned {} custom DNS records", records.len());
        Ok(records)
    }

    async fn create_record(&self, record: &DnsRecord) -> Result<DnsRecord> {
        tracing::debug!("Creating custom DNS record {}", record);
        self.add_record(record).await?;
        Ok(record.clone())
    }

    async fn get_record(&self, domain: &str) -> Result<DnsRecord> {
        let mut records = self.get_record_list(domain).await?;
        // get_record_list never returns an empty list
        Ok(records.swap_remove(0))
    }

    async fn get_record_list(&self, domain: &str) -> Result<DnsRecordList> {
        let matches: DnsRecordList = self
            .list_records()
            .await?
            .into_iter()
            .filter(|record| record.matches_domain(domain))
            .collect();

        if matches.is_empty() {
            return Err(Error::not_found(format!(
                "dns record with domain {:?} not found",
                domain
            )));
        }

        Ok(matches)
    }

    async fn delete_record(&self, domain: &str) -> Result<()> {
        for record in self.get_record_list(domain).await? {
            tracing::debug!("Deleting custom DNS record {}", record);
            self.remove_record(&record).await?;
        }
        Ok(())
    }

    async fn delete_exact(&self, record: &DnsRecord) -> Result<()> {
        let existing = self
            .get_record_list(&record.domain)
            .await?
            .into_iter()
            .find(|r| r.ip == record.ip)
            .ok_or_else(|| Error::not_found(format!("dns record {} not found", record)))?;

        tracing::debug!("Deleting custom DNS record {}", existing);
        self.remove_record(&existing).await
    }

    fn auth_mode(&self) -> AuthMode {
        match self.auth {
            Auth::Token(_) => AuthMode::Token,
            Auth::Session(_) => AuthMode::Session,
        }
    }

    fn client_name(&self) -> &'static str {
        "pihole"
    }
}

/// Factory for creating Pi-hole clients
pub struct PiholeFactory;

impl DnsClientFactory for PiholeFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsRecordClient>> {
        Ok(Box::new(PiholeClient::new(config)?))
    }
}

/// Register the Pi-hole client with a registry
///
/// # Example
///
/// ```rust
/// use pihole_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// pihole_client::register(&registry);
/// assert!(registry.has_client("pihole"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_client(PIHOLE_CLIENT, Box::new(PiholeFactory));
}
