//! Configuration types for the Pi-hole provider
//!
//! This module defines the provider configuration (how to reach and
//! authenticate against Pi-hole) and the state store configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Environment variable holding the Pi-hole base URL
pub const ENV_URL: &str = "PIHOLE_URL";
/// Environment variable holding the admin password (session path)
pub const ENV_PASSWORD: &str = "PIHOLE_PASSWORD";
/// Environment variable holding the API token (token path)
pub const ENV_API_TOKEN: &str = "PIHOLE_API_TOKEN";
/// Environment variable holding a custom User-Agent
pub const ENV_USER_AGENT: &str = "PIHOLE_USER_AGENT";
/// Environment variable holding a PEM CA bundle path
pub const ENV_CA_FILE: &str = "PIHOLE_CA_FILE";

/// How the client authenticates against Pi-hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Token-authenticated API (`/admin/api.php`)
    Token,
    /// Admin session scraping (`/admin/scripts/pi-hole/php/customdns.php`)
    Session,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Token => write!(f, "api token"),
            AuthMode::Session => write!(f, "admin session"),
        }
    }
}

/// Provider configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Pi-hole base URL (e.g. "http://pi.hole")
    pub url: String,

    /// Admin password, used to log in when no API token is set
    #[serde(default)]
    pub password: Option<String>,

    /// API token for the token-authenticated API
    #[serde(default)]
    pub api_token: Option<String>,

    /// Custom User-Agent for requests
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Path to an additional PEM root certificate
    #[serde(default)]
    pub ca_file: Option<String>,
}

// Secrets must never end up in logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .field("api_token", &self.api_token.as_ref().map(|_| "<REDACTED>"))
            .field("user_agent", &self.user_agent)
            .field("ca_file", &self.ca_file)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration for the given URL with no credentials
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the API token
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the admin password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Load configuration from environment variables
    ///
    /// Empty variables are treated as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any variable source keyed like the environment
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            url: get(ENV_URL).unwrap_or_default(),
            password: get(ENV_PASSWORD),
            api_token: get(ENV_API_TOKEN),
            user_agent: get(ENV_USER_AGENT),
            ca_file: get(ENV_CA_FILE),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config(format!(
                "Pi-hole URL is required. Set it via: export {}=http://pi.hole",
                ENV_URL
            )));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "Pi-hole URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }

        let has_token = self.api_token.as_deref().is_some_and(|t| !t.is_empty());
        let has_password = self.password.as_deref().is_some_and(|p| !p.is_empty());
        if !has_token && !has_password {
            return Err(crate::Error::config(format!(
                "Either an API token ({}) or a password ({}) is required",
                ENV_API_TOKEN, ENV_PASSWORD
            )));
        }

        Ok(())
    }

    /// Which authentication path the client will use
    ///
    /// The API token wins when both credentials are configured.
    pub fn auth_mode(&self) -> AuthMode {
        match self.api_token.as_deref() {
            Some(token) if !token.is_empty() => AuthMode::Token,
            _ => AuthMode::Session,
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// State store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateStoreConfig {
    /// File-based state store
    File {
        /// Path to the state file
        path: String,
    },

    /// In-memory state store (not persistent)
    #[default]
    Memory,
}

impl StateStoreConfig {
    /// Get the state store type name
    pub fn type_name(&self) -> &str {
        match self {
            StateStoreConfig::File { .. } => "file",
            StateStoreConfig::Memory => "memory",
        }
    }
}
