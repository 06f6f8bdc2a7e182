// # pihole-dns - Pi-hole local DNS record provider
//
// This binary is a THIN integration layer:
// 1. Reading configuration from flags and environment variables
// 2. Initializing logging and the runtime
// 3. Registering the Pi-hole client with the registry
// 4. Running one lifecycle command against the state file
//
// Resource semantics live in pihole-core, HTTP details in pihole-client.
//
// ## Configuration
//
// - `PIHOLE_URL`: Pi-hole base URL
// - `PIHOLE_API_TOKEN`: API token (preferred)
// - `PIHOLE_PASSWORD`: Admin password (used when no token is set)
// - `PIHOLE_USER_AGENT`: Custom User-Agent
// - `PIHOLE_CA_FILE`: Additional PEM root certificate
// - `PIHOLE_STATE_PATH`: State file (default `terraform.pihole.json`)
// - `PIHOLE_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export PIHOLE_URL=http://pi.hole
// export PIHOLE_API_TOKEN=your_token
//
// pihole-dns apply pihole_dns_record.nas --domain nas.lan --ip 192.168.1.10
// pihole-dns refresh
// pihole-dns destroy pihole_dns_record.nas
// ```
//
// Results go to stdout, logs to stderr.

mod cli;

use anyhow::Result;
use clap::Parser;
use pihole_core::lifecycle::ApplyOutcome;
use pihole_core::traits::StateStore;
use pihole_core::{
    Lifecycle, PiholeProvider, ProviderConfig, ProviderRegistry, ResourceData, StateStoreConfig,
};
use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Command};

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Configuration or startup error
/// - 2: Runtime error (Pi-hole or state failure)
#[derive(Debug, Clone, Copy)]
enum PiholeExitCode {
    /// Command completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<PiholeExitCode> for ExitCode {
    fn from(code: PiholeExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.loglevel))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PiholeExitCode::ConfigError.into();
    }

    let config = cli.provider_config();
    if needs_client(&cli.command)
        && let Err(e) = config.validate()
    {
        eprintln!("Configuration validation error: {}", e);
        return PiholeExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PiholeExitCode::ConfigError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run(cli, config).await {
            error!("{:#}", e);
            PiholeExitCode::RuntimeError
        } else {
            PiholeExitCode::Success
        }
    });

    result.into()
}

/// Whether a command talks to Pi-hole
fn needs_client(command: &Command) -> bool {
    !matches!(command, Command::Schema | Command::State)
}

async fn run(cli: Cli, config: ProviderConfig) -> Result<()> {
    let provider = Arc::new(PiholeProvider::new());

    if let Command::Schema = cli.command {
        println!("{}", serde_json::to_string_pretty(&provider.schema())?);
        return Ok(());
    }

    let registry = ProviderRegistry::with_builtin_state_stores();
    pihole_client::register(&registry);

    let state = registry
        .create_state_store(&StateStoreConfig::File {
            path: cli.state.clone(),
        })
        .await?;

    if let Command::State = cli.command {
        return print_state(state.as_ref()).await;
    }

    let client = provider.configure(&config, &registry)?;

    if let Command::List = cli.command {
        for record in client.list_records().await? {
            println!("{}\t{}", record.domain, record.ip);
        }
        return Ok(());
    }

    let lifecycle = Lifecycle::new(provider, client, state);

    match cli.command {
        Command::Apply {
            address,
            domain,
            ip,
        } => {
            let resource_type = cli::resource_type(&address)?;
            let desired = ResourceData::new().with("domain", domain).with("ip", ip);
            let outcome = lifecycle.apply(&address, resource_type, desired).await?;
            lifecycle.state().flush().await?;
            println!("{}", describe(&address, &outcome));
        }
        Command::Refresh { address: Some(address) } => {
            match lifecycle.refresh(&address).await? {
                Some(state) => println!("{}: {}", address, state.id),
                None => println!("{}: removed (gone from Pi-hole)", address),
            }
            lifecycle.state().flush().await?;
        }
        Command::Refresh { address: None } => {
            let report = lifecycle.refresh_all().await?;
            for address in &report.kept {
                println!("{}: ok", address);
            }
            for address in &report.removed {
                println!("{}: removed (gone from Pi-hole)", address);
            }
        }
        Command::Destroy { address } => {
            lifecycle.destroy(&address).await?;
            println!("{}: destroyed", address);
        }
        Command::Import { address, id } => {
            let resource_type = cli::resource_type(&address)?;
            let state = lifecycle.import(&address, resource_type, &id).await?;
            println!("{}: imported {}", address, state.id);
        }
        Command::Schema | Command::List | Command::State => {}
    }

    info!("Done");
    Ok(())
}

fn describe(address: &str, outcome: &ApplyOutcome) -> String {
    match outcome {
        ApplyOutcome::Created { id } => format!("{}: created {}", address, id),
        ApplyOutcome::Unchanged { id } => format!("{}: unchanged {}", address, id),
        ApplyOutcome::Recreated { id } => format!("{}: recreated {}", address, id),
        ApplyOutcome::Replaced { old_id, new_id } => {
            format!("{}: replaced {} with {}", address, old_id, new_id)
        }
    }
}

async fn print_state(state: &dyn StateStore) -> Result<()> {
    let mut resources = BTreeMap::new();
    for address in state.list().await? {
        if let Some(resource) = state.get(&address).await? {
            resources.insert(address, resource);
        }
    }
    println!("{}", serde_json::to_string_pretty(&resources)?);
    Ok(())
}
