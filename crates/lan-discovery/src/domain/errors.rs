//! Domain errors for LAN discovery

use shared_bus::SubscriptionError;
use thiserror::Error;

/// Failures reported by a protocol backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The service could not be advertised (or re-advertised).
    #[error("advertise failed: {0}")]
    Advertise(String),

    /// Peer resolution could not be started.
    #[error("resolver activation failed: {0}")]
    Resolver(String),

    /// The underlying daemon is unavailable.
    #[error("discovery daemon error: {0}")]
    Daemon(String),
}

/// Errors surfaced to callers of a discovery session.
///
/// Advertisement and publish failures never reach callers; they are logged
/// by the background loops.
#[derive(Debug, Error)]
pub enum LanDiscoveryError {
    /// The fan-out bus refused a new subscription (e.g. session stopped).
    #[error("subscription refused: {0}")]
    Subscription(#[from] SubscriptionError),

    /// This call won the activation race but the resolver failed to start.
    /// Activation is not retried for the rest of the session.
    #[error("resolver activation failed: {0}")]
    ResolverActivation(#[source] ProtocolError),

    /// Construction happened outside a tokio runtime.
    #[error("no tokio runtime available to run discovery loops")]
    NoRuntime,

    /// The supplied configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
