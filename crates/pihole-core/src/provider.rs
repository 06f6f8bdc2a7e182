//! Pi-hole provider definition
//!
//! Declares the provider configuration block and the resources it serves,
//! and turns a [`ProviderConfig`] into a configured client.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::config::{
    ENV_API_TOKEN, ENV_CA_FILE, ENV_PASSWORD, ENV_URL, ENV_USER_AGENT, ProviderConfig,
};
use crate::error::Result;
use crate::registry::ProviderRegistry;
use crate::resource::{DnsRecordResource, Resource};
use crate::schema::{Attribute, ProviderSchema, ResourceSchema};
use crate::traits::DnsRecordClient;

/// Name under which the Pi-hole HTTP client factory is registered
pub const PIHOLE_CLIENT: &str = "pihole";

/// The Pi-hole provider
pub struct PiholeProvider {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
}

impl Default for PiholeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PiholeProvider {
    /// Create the provider with its built-in resources
    pub fn new() -> Self {
        let mut provider = Self {
            resources: BTreeMap::new(),
        };
        provider.register_resource(Arc::new(DnsRecordResource::new()));
        provider
    }

    /// Register an additional resource
    pub fn register_resource(&mut self, resource: Arc<dyn Resource>) {
        self.resources.insert(resource.type_name(), resource);
    }

    /// Schema of the provider configuration block
    pub fn config_schema() -> ResourceSchema {
        ResourceSchema::new("Pi-hole local DNS provider")
            .with_attribute(
                "url",
                Attribute::required_string()
                    .with_description("URL where Pi-hole is deployed")
                    .with_env_default(ENV_URL),
            )
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .with_description("The admin password used to login to the admin dashboard")
                    .sensitive()
                    .with_env_default(ENV_PASSWORD),
            )
            .with_attribute(
                "api_token",
                Attribute::optional_string()
                    .with_description("API token used when making requests to the Pi-hole API")
                    .sensitive()
                    .with_env_default(ENV_API_TOKEN),
            )
            .with_attribute(
                "user_agent",
                Attribute::optional_string()
                    .with_description("User agent sent with requests to Pi-hole")
                    .with_env_default(ENV_USER_AGENT),
            )
            .with_attribute(
                "ca_file",
                Attribute::optional_string()
                    .with_description("CA file to connect to Pi-hole with TLS")
                    .with_env_default(ENV_CA_FILE),
            )
    }

    /// Full provider schema
    pub fn schema(&self) -> ProviderSchema {
        ProviderSchema {
            provider: Self::config_schema(),
            resources: self
                .resources
                .iter()
                .map(|(name, resource)| (name.to_string(), resource.schema()))
                .collect(),
        }
    }

    /// Validate the configuration and build a client through the registry
    pub fn configure(
        &self,
        config: &ProviderConfig,
        registry: &ProviderRegistry,
    ) -> Result<Arc<dyn DnsRecordClient>> {
        config.validate()?;

        let client = registry.create_client(PIHOLE_CLIENT, config)?;
        info!(
            "Configured {} client for {} using {}",
            client.client_name(),
            config.base_url(),
            client.auth_mode()
        );

        Ok(Arc::from(client))
    }

    /// Look up a resource by type name
    pub fn resource(&self, type_name: &str) -> Option<Arc<dyn Resource>> {
        self.resources.get(type_name).cloned()
    }

    /// Registered resource type names, sorted
    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_registers_dns_record_resource() {
        let provider = PiholeProvider::new();
        assert_eq!(provider.resource_types(), vec!["pihole_dns_record"]);
        assert!(provider.resource("pihole_dns_record").is_some());
        assert!(provider.resource("pihole_cname_record").is_none());
    }

    #[test]
    fn test_schema_marks_credentials_sensitive() {
        let schema = PiholeProvider::new().schema();
        assert!(schema.provider.attributes["password"].sensitive);
        assert!(schema.provider.attributes["api_token"].sensitive);
        assert!(schema.provider.attributes["url"].required);
        assert!(schema.resources.contains_key("pihole_dns_record"));
    }

    #[test]
    fn test_configure_rejects_invalid_config() {
        let provider = PiholeProvider::new();
        let registry = ProviderRegistry::new();
        let result = provider.configure(&ProviderConfig::new("http://pi.hole"), &registry);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_configure_requires_registered_client() {
        let provider = PiholeProvider::new();
        let registry = ProviderRegistry::new();
        let config = ProviderConfig::new("http://pi.hole").with_api_token("token");
        let result = provider.configure(&config, &registry);
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("pihole")));
    }
}
