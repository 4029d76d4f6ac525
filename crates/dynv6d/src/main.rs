// # dynv6d - dynv6 Update Daemon
//
// This is a thin integration layer. All detection, retry and cache logic
// lives in dynv6-core.
//
// The dynv6d daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring address sources, the address store and the update API
// 4. Running the scheduler and mapping its result to an exit code
//
// ## Configuration
//
// All configuration is done via environment variables (prefix matched
// case-insensitively):
//
// - `DYNV6_HOSTNAME`: Hostname to update (required)
// - `DYNV6_TOKEN`: HTTP token of the zone (required)
// - `DYNV6_INTERVAL`: Seconds between cycles (default 600)
// - `DYNV6_NO_IPV4` / `DYNV6_NO_IPV6`: Skip a family
// - `DYNV6_INTERFACE`: Interface carrying the IPv6 address (default eth0)
// - `DYNV6_LOG_LEVEL`: TRACE, DEBUG, INFO, SUCCESS, WARNING, ERROR, CRITICAL
// - `DYNV6_DATA_DIR`: Directory for the cached addresses (default data)
// - `DYNV6_API`: `update` (default) or `dyndns`
//
// ## Example
//
// ```bash
// export DYNV6_HOSTNAME=myhost.dynv6.net
// export DYNV6_TOKEN=your_token
// export DYNV6_INTERVAL=300
//
// dynv6d
// ```

use anyhow::{Context, Result};
use dynv6_core::traits::{AddressFamily, AddressSource};
use dynv6_core::{Dynv6Config, FileAddressStore, Scheduler, UpdateClient};
use dynv6_ip_http::HttpIpv4Source;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown, or the update API rejected the request
/// - 1: Configuration or startup error
/// - 2: Runtime error (storage failure, runtime creation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dynv6ExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown,
    /// The update API refused the request; retrying cannot help
    UpdateRejected,
    /// Configuration error or startup failure
    ConfigError,
    /// Runtime error (unexpected failure)
    RuntimeError,
}

impl From<Dynv6ExitCode> for ExitCode {
    fn from(code: Dynv6ExitCode) -> Self {
        match code {
            Dynv6ExitCode::CleanShutdown | Dynv6ExitCode::UpdateRejected => ExitCode::SUCCESS,
            Dynv6ExitCode::ConfigError => ExitCode::from(1),
            Dynv6ExitCode::RuntimeError => ExitCode::from(2),
        }
    }
}

impl Dynv6ExitCode {
    /// Classify an error that ended the daemon
    fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<dynv6_core::Error>() {
            Some(dynv6_core::Error::UpdateRejected { .. }) => Self::UpdateRejected,
            Some(dynv6_core::Error::ConfigMissing(_) | dynv6_core::Error::Config(_)) => {
                Self::ConfigError
            }
            _ => Self::RuntimeError,
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Dynv6Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Dynv6ExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level.as_tracing())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return Dynv6ExitCode::ConfigError.into();
    }

    info!("Starting dynv6d for {}", config.hostname);
    debug!("Configuration: {:?}", config);

    // One thread of control: cycles are strictly sequential
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return Dynv6ExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => Dynv6ExitCode::CleanShutdown,
            Err(e) => {
                let code = Dynv6ExitCode::from_error(&e);
                if code == Dynv6ExitCode::UpdateRejected {
                    info!("Exiting after rejected update: {:#}", e);
                } else {
                    error!("Daemon error: {:#}", e);
                }
                code
            }
        }
    });

    info!("dynv6d stopped ({:?})", code);
    code.into()
}

/// Build every component and run the scheduler until shutdown or a fatal error
async fn run_daemon(config: Dynv6Config) -> Result<()> {
    let sources = build_sources(&config)?;

    let store = FileAddressStore::open(&config.data_dir)
        .await
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;

    let api = dynv6_provider::create_update_api(&config)?;
    info!(
        "Updating {} via {} every {:?}",
        config.hostname,
        api.api_name(),
        config.interval()
    );

    let client = UpdateClient::new(&config, sources, Box::new(store), api)?;
    let mut scheduler = Scheduler::new(client, config.interval());

    scheduler.run().await?;
    info!("Shutting down daemon");
    Ok(())
}

/// One address source per enabled family
fn build_sources(config: &Dynv6Config) -> Result<Vec<Box<dyn AddressSource>>> {
    let mut sources: Vec<Box<dyn AddressSource>> = Vec::new();

    for family in config.enabled_families() {
        match family {
            AddressFamily::Ipv4 => {
                let source = HttpIpv4Source::new()?;
                info!("IPv4 source: {}", source.url());
                sources.push(Box::new(source));
            }
            AddressFamily::Ipv6 => sources.push(ipv6_source(config)?),
        }
    }

    Ok(sources)
}

#[cfg(feature = "iface")]
fn ipv6_source(config: &Dynv6Config) -> Result<Box<dyn AddressSource>> {
    info!("IPv6 source: interface {}", config.interface);
    Ok(Box::new(dynv6_ip_iface::InterfaceIpv6Source::new(
        config.interface.as_str(),
    )))
}

#[cfg(not(feature = "iface"))]
fn ipv6_source(_config: &Dynv6Config) -> Result<Box<dyn AddressSource>> {
    Err(dynv6_core::Error::config(
        "IPv6 support was not compiled in (feature `iface`); set DYNV6_NO_IPV6=true",
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_exits_cleanly() {
        let err = anyhow::Error::from(dynv6_core::Error::UpdateRejected {
            status: 401,
            body: "invalid authentication token".to_string(),
        });

        let code = Dynv6ExitCode::from_error(&err);

        assert_eq!(code, Dynv6ExitCode::UpdateRejected);
    }

    #[test]
    fn test_config_errors_map_to_config_exit() {
        let missing = anyhow::Error::from(dynv6_core::Error::config_missing("hostname"));
        let invalid = anyhow::Error::from(dynv6_core::Error::config("bad interval"));

        assert_eq!(Dynv6ExitCode::from_error(&missing), Dynv6ExitCode::ConfigError);
        assert_eq!(Dynv6ExitCode::from_error(&invalid), Dynv6ExitCode::ConfigError);
    }

    #[test]
    fn test_storage_failure_behind_context_is_runtime_error() {
        let err = anyhow::Error::from(dynv6_core::Error::storage("disk full"))
            .context("Failed to open data directory data");

        assert_eq!(Dynv6ExitCode::from_error(&err), Dynv6ExitCode::RuntimeError);
    }

    #[test]
    fn test_foreign_error_is_runtime_error() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(Dynv6ExitCode::from_error(&err), Dynv6ExitCode::RuntimeError);
    }

    #[test]
    fn test_sources_follow_enabled_families() {
        let mut config = Dynv6Config::new("myhost.dynv6.net", "token");
        config.no_ipv6 = true;

        let sources = build_sources(&config).unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].family(), AddressFamily::Ipv4);
    }
}
