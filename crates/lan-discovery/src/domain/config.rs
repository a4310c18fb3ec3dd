//! Session constants and configuration.

use std::time::Duration;

use super::entities::ServiceIdentity;
use super::errors::ConfigError;

/// Instance name advertised when none is configured
pub const DEFAULT_INSTANCE_NAME: &str = "lan-node";

/// Service name shared by every node of the network
pub const DEFAULT_SERVICE_NAME: &str = "lanDiscover";

/// Multicast DNS domain
pub const DEFAULT_DOMAIN_NAME: &str = "local";

/// Interval between re-advertisements (10 minutes)
pub const DEFAULT_REGISTER_CYCLE: Duration = Duration::from_secs(10 * 60);

/// Delay before the first advertisement
pub const DEFAULT_REGISTER_DELAY: Duration = Duration::ZERO;

/// Capacity of the queue between the resolver and the relay
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Configuration of a discovery session, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanDiscoveryConfig {
    /// Name of this node's service instance
    pub instance_name: String,
    /// Service name to advertise and resolve
    pub service_name: String,
    /// Discovery domain
    pub domain_name: String,
    /// Port advertised for this node
    pub service_port: u16,
    /// Interval between re-advertisements
    pub register_cycle: Duration,
    /// Delay before the first advertisement
    pub register_delay: Duration,
    /// Bound of the resolver → relay queue
    pub queue_capacity: usize,
}

impl Default for LanDiscoveryConfig {
    fn default() -> Self {
        Self {
            instance_name: DEFAULT_INSTANCE_NAME.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            domain_name: DEFAULT_DOMAIN_NAME.to_string(),
            service_port: 0,
            register_cycle: DEFAULT_REGISTER_CYCLE,
            register_delay: DEFAULT_REGISTER_DELAY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl LanDiscoveryConfig {
    /// Defaults with the given service port.
    #[must_use]
    pub fn new(service_port: u16) -> Self {
        Self {
            service_port,
            ..Self::default()
        }
    }

    /// Short cycle and small queue for tests.
    #[must_use]
    pub fn for_testing(service_port: u16) -> Self {
        Self {
            instance_name: "test-node".to_string(),
            service_port,
            register_cycle: Duration::from_secs(60),
            queue_capacity: 16,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = name.into();
        self
    }

    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    #[must_use]
    pub fn with_domain_name(mut self, name: impl Into<String>) -> Self {
        self.domain_name = name.into();
        self
    }

    #[must_use]
    pub fn with_register_cycle(mut self, cycle: Duration) -> Self {
        self.register_cycle = cycle;
        self
    }

    #[must_use]
    pub fn with_register_delay(mut self, delay: Duration) -> Self {
        self.register_delay = delay;
        self
    }

    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// The identity advertised and resolved by a session using this config.
    #[must_use]
    pub fn identity(&self) -> ServiceIdentity {
        ServiceIdentity::new(&self.instance_name, &self.service_name, &self.domain_name)
    }

    /// Reject configurations a session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("instance_name", &self.instance_name),
            ("service_name", &self.service_name),
            ("domain_name", &self.domain_name),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        if self.service_port == 0 {
            return Err(ConfigError::Invalid("service_port must not be 0".into()));
        }
        if self.register_cycle.is_zero() {
            return Err(ConfigError::Invalid("register_cycle must be positive".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue_capacity must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LanDiscoveryConfig::new(4000);
        assert_eq!(config.service_name, "lanDiscover");
        assert_eq!(config.domain_name, "local");
        assert_eq!(config.register_cycle, Duration::from_secs(600));
        assert_eq!(config.register_delay, Duration::ZERO);
        assert_eq!(config.queue_capacity, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_port_is_rejected() {
        let err = LanDiscoveryConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("service_port"));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = LanDiscoveryConfig::new(4000)
            .with_instance_name("  ")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("instance_name"));
    }

    #[test]
    fn test_zero_cycle_and_capacity_are_rejected() {
        assert!(LanDiscoveryConfig::new(4000)
            .with_register_cycle(Duration::ZERO)
            .validate()
            .is_err());
        assert!(LanDiscoveryConfig::new(4000)
            .with_queue_capacity(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_identity_from_config() {
        let identity = LanDiscoveryConfig::new(4000)
            .with_instance_name("node-a")
            .with_domain_name("lan")
            .identity();
        assert_eq!(identity, ServiceIdentity::new("node-a", "lanDiscover", "lan"));
    }
}
