//! # LAN Node
//!
//! Advertises this host's service on the local network and logs every peer
//! running the same service.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics
//! 2. Load configuration (`LAN_CONFIG` file, then env overrides)
//! 3. Start the mDNS backend and the discovery session
//! 4. Subscribe and log peers until Ctrl+C
//! 5. Stop the session

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use lan_discovery::{
    apply_env_overrides, ConfigProvider, LanDiscover, LanDiscoveryApi, LanDiscoveryConfig,
    MdnsSdProtocol, StaticConfigProvider, TomlConfigProvider,
};
use lan_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};

/// Path of the optional TOML config file.
const ENV_CONFIG_PATH: &str = "LAN_CONFIG";

/// A running node: the discovery session and its peer logger.
struct LanNode {
    session: LanDiscover,
    peer_logger: JoinHandle<()>,
}

impl LanNode {
    fn start(config: LanDiscoveryConfig) -> Result<Self> {
        let protocol = MdnsSdProtocol::new().context("failed to start mDNS daemon")?;
        let session = LanDiscover::new(config, Arc::new(protocol))
            .context("failed to start LAN discovery")?;

        let mut peers = session
            .subscribe()
            .context("failed to subscribe to discovered peers")?;
        let peer_logger = tokio::spawn(async move {
            while let Some(peer) = peers.recv().await {
                info!(%peer, "Peer discovered");
            }
        });

        Ok(Self {
            session,
            peer_logger,
        })
    }

    /// Stop the session; the logger ends once the bus closes.
    async fn shutdown(self) {
        info!("Initiating graceful shutdown...");
        self.session.stop().await;
        if let Err(e) = self.peer_logger.await {
            warn!(error = %e, "Peer logger ended abnormally");
        }
        match encode_metrics() {
            Ok(metrics) => debug!(%metrics, "Final metrics"),
            Err(e) => warn!(error = %e, "Failed to encode metrics"),
        }
        info!("Shutdown complete");
    }
}

/// The given TOML file, or built-in defaults without one.
fn config_provider(path: Option<PathBuf>) -> Result<Box<dyn ConfigProvider>> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration file");
            let provider = TomlConfigProvider::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            Ok(Box::new(provider))
        }
        None => Ok(Box::new(StaticConfigProvider::new(
            LanDiscoveryConfig::default(),
        ))),
    }
}

/// Load configuration from file and environment.
fn load_config() -> Result<LanDiscoveryConfig> {
    let path = std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
    let mut config = config_provider(path)?.lan_discovery_config();
    apply_env_overrides(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = load_config()?;
    info!(
        instance = %config.instance_name,
        service = %config.service_name,
        domain = %config.domain_name,
        port = config.service_port,
        "Starting LAN node"
    );

    let node = LanNode::start(config)?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    node.shutdown().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_config_file() {
        let config = config_provider(None).unwrap().lan_discovery_config();
        assert_eq!(config, LanDiscoveryConfig::default());
    }

    #[test]
    fn test_config_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[lan_discovery]\ninstance_name = \"node-a\"\nservice_port = 4000").unwrap();

        let config = config_provider(Some(file.path().to_path_buf()))
            .unwrap()
            .lan_discovery_config();
        assert_eq!(config.instance_name, "node-a");
        assert_eq!(config.service_port, 4000);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/lan-node.toml");
        assert!(config_provider(Some(path)).is_err());
    }
}
