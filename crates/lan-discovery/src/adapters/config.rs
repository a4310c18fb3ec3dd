use tracing::warn;

use crate::domain::LanDiscoveryConfig;
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - Fixed config for tests and embedding
// ============================================================================

/// Configuration provider handing out a fixed config.
///
/// For deployments, use `TomlConfigProvider`.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    config: LanDiscoveryConfig,
}

impl StaticConfigProvider {
    #[must_use]
    pub fn new(config: LanDiscoveryConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn lan_discovery_config(&self) -> LanDiscoveryConfig {
        self.config.clone()
    }
}

// ============================================================================
// Environment overrides
// ============================================================================

/// Instance name override
pub const ENV_INSTANCE_NAME: &str = "LAN_INSTANCE_NAME";

/// Service port override
pub const ENV_SERVICE_PORT: &str = "LAN_SERVICE_PORT";

/// Apply `LAN_INSTANCE_NAME` and `LAN_SERVICE_PORT` from the process
/// environment.
pub fn apply_env_overrides(config: &mut LanDiscoveryConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary key lookup.
///
/// Unparseable values are ignored with a warning.
pub fn apply_overrides(config: &mut LanDiscoveryConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(name) = lookup(ENV_INSTANCE_NAME) {
        config.instance_name = name;
    }
    if let Some(raw) = lookup(ENV_SERVICE_PORT) {
        match raw.trim().parse::<u16>() {
            Ok(port) => config.service_port = port,
            Err(e) => warn!(
                variable = ENV_SERVICE_PORT,
                value = %raw,
                error = %e,
                "Ignoring invalid port override"
            ),
        }
    }
}

// ============================================================================
// TomlConfigProvider - File-based config (requires "toml-config" feature)
// ============================================================================

#[cfg(feature = "toml-config")]
mod toml_config {
    use super::*;
    use crate::domain::ConfigError;
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    /// Configuration file structure.
    #[derive(Debug, Deserialize)]
    struct ConfigFile {
        #[serde(default)]
        lan_discovery: LanDiscoveryFile,
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    struct LanDiscoveryFile {
        instance_name: Option<String>,
        service_name: Option<String>,
        domain_name: Option<String>,
        service_port: Option<u16>,
        register_cycle_secs: Option<u64>,
        register_delay_secs: Option<u64>,
        queue_capacity: Option<usize>,
    }

    /// TOML-based configuration provider.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [lan_discovery]
    /// instance_name = "node-a"
    /// service_name = "lanDiscover"
    /// domain_name = "local"
    /// service_port = 4000
    /// register_cycle_secs = 600
    /// register_delay_secs = 0
    /// queue_capacity = 1024
    /// ```
    ///
    /// Every key is optional. Validation happens when a session starts, so
    /// overrides can still fill in a missing port.
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        config: LanDiscoveryConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        ///
        /// # Errors
        ///
        /// Returns error if the file cannot be read or parsed.
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                source: e,
            })?;

            Self::parse(&content)
        }

        /// Parse configuration from a TOML string.
        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let lc = file.lan_discovery;
            let defaults = LanDiscoveryConfig::default();
            let config = LanDiscoveryConfig {
                instance_name: lc.instance_name.unwrap_or(defaults.instance_name),
                service_name: lc.service_name.unwrap_or(defaults.service_name),
                domain_name: lc.domain_name.unwrap_or(defaults.domain_name),
                service_port: lc.service_port.unwrap_or(defaults.service_port),
                register_cycle: lc
                    .register_cycle_secs
                    .map_or(defaults.register_cycle, Duration::from_secs),
                register_delay: lc
                    .register_delay_secs
                    .map_or(defaults.register_delay, Duration::from_secs),
                queue_capacity: lc.queue_capacity.unwrap_or(defaults.queue_capacity),
            };
            Ok(Self { config })
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn lan_discovery_config(&self) -> LanDiscoveryConfig {
            self.config.clone()
        }
    }
}

#[cfg(feature = "toml-config")]
pub use toml_config::TomlConfigProvider;
