//! Prometheus metrics for LAN discovery.
//!
//! All metrics follow the naming convention: `lan_discovery_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // REGISTRATION LOOP
    // =========================================================================

    /// Successful advertisements (initial and periodic)
    pub static ref ADVERTISEMENTS: Counter = Counter::new(
        "lan_discovery_advertisements_total",
        "Total number of successful service advertisements"
    ).expect("metric creation failed");

    /// Failed advertisements; each one ends the registration loop
    pub static ref ADVERTISE_FAILURES: Counter = Counter::new(
        "lan_discovery_advertise_failures_total",
        "Total number of failed service advertisements"
    ).expect("metric creation failed");

    // =========================================================================
    // RESOLUTION RELAY
    // =========================================================================

    /// Peer events handed to the fan-out bus
    pub static ref PEER_EVENTS_RELAYED: Counter = Counter::new(
        "lan_discovery_peer_events_relayed_total",
        "Total number of discovered-peer events relayed to subscribers"
    ).expect("metric creation failed");

    /// Peer events the fan-out bus refused
    pub static ref PUBLISH_FAILURES: Counter = Counter::new(
        "lan_discovery_publish_failures_total",
        "Total number of discovered-peer events that failed to publish"
    ).expect("metric creation failed");

    // =========================================================================
    // SUBSCRIPTION GATE
    // =========================================================================

    /// Resolver activations (at most one per session)
    pub static ref RESOLVER_ACTIVATIONS: Counter = Counter::new(
        "lan_discovery_resolver_activations_total",
        "Total number of resolver activations"
    ).expect("metric creation failed");

    /// Subscriptions handed out by the subscription gate
    pub static ref SUBSCRIPTIONS_CREATED: Counter = Counter::new(
        "lan_discovery_subscriptions_total",
        "Total number of subscriptions handed out"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered metrics are kept.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ADVERTISEMENTS.clone()),
        Box::new(ADVERTISE_FAILURES.clone()),
        Box::new(PEER_EVENTS_RELAYED.clone()),
        Box::new(PUBLISH_FAILURES.clone()),
        Box::new(RESOLVER_ACTIVATIONS.clone()),
        Box::new(SUBSCRIPTIONS_CREATED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
