use clap::{Parser, Subcommand, ValueEnum};
use pihole_core::config::{ENV_API_TOKEN, ENV_CA_FILE, ENV_PASSWORD, ENV_URL, ENV_USER_AGENT};
use pihole_core::ProviderConfig;
use tracing::Level;

/// Environment variable holding the state file path
pub const ENV_STATE_PATH: &str = "PIHOLE_STATE_PATH";

/// Environment variable holding the log level
pub const ENV_LOG_LEVEL: &str = "PIHOLE_LOG_LEVEL";

/// Default state file
pub const DEFAULT_STATE_PATH: &str = "terraform.pihole.json";

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pi-hole base URL, e.g. http://pi.hole
    #[arg(long, global = true, env = ENV_URL)]
    pub url: Option<String>,

    /// Admin password, used when no API token is set
    #[arg(long, global = true, env = ENV_PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// API token; takes precedence over the password
    #[arg(long, global = true, env = ENV_API_TOKEN, hide_env_values = true)]
    pub api_token: Option<String>,

    /// User-Agent sent with every request
    #[arg(long, global = true, env = ENV_USER_AGENT)]
    pub user_agent: Option<String>,

    /// Additional PEM root certificate to trust
    #[arg(long, global = true, value_name = "PATH", env = ENV_CA_FILE)]
    pub ca_file: Option<String>,

    /// State file of managed resources
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = DEFAULT_STATE_PATH,
        env = ENV_STATE_PATH
    )]
    pub state: String,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        global = true,
        ignore_case = true,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = ENV_LOG_LEVEL
    )]
    pub loglevel: Loglevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the provider and resource schemas as JSON
    Schema,
    /// List every custom DNS record in Pi-hole
    List,
    /// Create or converge a record at a resource address
    Apply {
        /// Resource address, e.g. pihole_dns_record.nas
        address: String,
        /// Domain of the record
        #[arg(long)]
        domain: String,
        /// IP address the domain resolves to
        #[arg(long)]
        ip: String,
    },
    /// Re-read managed records from Pi-hole, dropping the ones that are gone
    Refresh {
        /// Only refresh this address
        address: Option<String>,
    },
    /// Delete a managed record and forget it
    Destroy {
        /// Resource address
        address: String,
    },
    /// Bring an existing record under management
    Import {
        /// Resource address
        address: String,
        /// Record ID, "{domain}_{ip}"
        id: String,
    },
    /// Print the managed resources as JSON
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Loglevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Loglevel> for Level {
    fn from(level: Loglevel) -> Self {
        match level {
            Loglevel::Trace => Level::TRACE,
            Loglevel::Debug => Level::DEBUG,
            Loglevel::Info => Level::INFO,
            Loglevel::Warn => Level::WARN,
            Loglevel::Error => Level::ERROR,
        }
    }
}

impl Cli {
    /// Provider configuration from flags and their environment fallbacks
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            url: self.url.clone().unwrap_or_default(),
            password: non_empty(&self.password),
            api_token: non_empty(&self.api_token),
            user_agent: non_empty(&self.user_agent),
            ca_file: non_empty(&self.ca_file),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

/// Resource type of an address such as `pihole_dns_record.nas`
pub fn resource_type(address: &str) -> anyhow::Result<&str> {
    match address.split_once('.') {
        Some((resource_type, name)) if !resource_type.is_empty() && !name.is_empty() => {
            Ok(resource_type)
        }
        _ => anyhow::bail!(
            "Invalid resource address '{}'. Expected <type>.<name>, e.g. pihole_dns_record.nas",
            address
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type() {
        assert_eq!(
            resource_type("pihole_dns_record.nas").unwrap(),
            "pihole_dns_record"
        );
        assert!(resource_type("pihole_dns_record").is_err());
        assert!(resource_type(".nas").is_err());
        assert!(resource_type("pihole_dns_record.").is_err());
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "pihole-dns",
            "--url",
            "http://pi.hole",
            "--api-token",
            "abc",
            "apply",
            "pihole_dns_record.nas",
            "--domain",
            "nas.lan",
            "--ip",
            "10.0.0.2",
        ])
        .unwrap();

        match cli.command {
            Command::Apply {
                ref address,
                ref domain,
                ref ip,
            } => {
                assert_eq!(address, "pihole_dns_record.nas");
                assert_eq!(domain, "nas.lan");
                assert_eq!(ip, "10.0.0.2");
            }
            _ => panic!("expected apply"),
        }

        let config = cli.provider_config();
        assert_eq!(config.url, "http://pi.hole");
        assert_eq!(config.api_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_credentials_are_unset() {
        let cli = Cli::try_parse_from([
            "pihole-dns",
            "--url",
            "http://pi.hole",
            "--password",
            "",
            "list",
        ])
        .unwrap();
        assert!(cli.provider_config().password.is_none());
    }
}
