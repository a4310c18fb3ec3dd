//! # LAN Peer Discovery
//!
//! Advertises this node's service on the local network segment and reports
//! other instances of the same service to any number of subscribers.
//!
//! The multicast protocol itself lives behind the [`MdnsProtocol`] port.
//! This crate owns the coordination around it:
//!
//! - periodic re-advertisement that survives stale records
//! - exactly-once resolver activation no matter how many subscribers arrive
//! - FIFO relay of resolved peers onto an in-process fan-out bus
//! - a single stop that ends every background loop
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** peer events, service identity, config, errors
//! - **Ports Layer:** `LanDiscoveryApi` (driving), `MdnsProtocol` and
//!   `ConfigProvider` (driven)
//! - **Service Layer:** `LanDiscover`, the running session
//! - **Adapters Layer:** mDNS backend and config loaders (feature-gated)
//!
//! ## Example
//!
//! ```rust,ignore
//! use lan_discovery::{LanDiscover, LanDiscoveryApi, LanDiscoveryConfig, MdnsSdProtocol};
//! use std::sync::Arc;
//!
//! let protocol = Arc::new(MdnsSdProtocol::new()?);
//! let session = LanDiscover::new(LanDiscoveryConfig::new(4000), protocol)?;
//!
//! let mut peers = session.subscribe()?;
//! while let Some(peer) = peers.recv().await {
//!     tracing::info!(%peer, "Peer discovered");
//! }
//!
//! session.stop().await;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod domain;
pub mod ports;
pub mod service;

// =============================================================================
// ADAPTERS
// =============================================================================

/// Config providers, and the mDNS backend with feature `mdns`.
pub mod adapters;

/// Recording protocol stub.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// RE-EXPORTS
// =============================================================================

// Domain
pub use domain::{
    ConfigError, LanDiscoveryConfig, LanDiscoveryError, LanPeerEvent, ProtocolError,
    ServiceIdentity, DEFAULT_DOMAIN_NAME, DEFAULT_INSTANCE_NAME, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_REGISTER_CYCLE, DEFAULT_REGISTER_DELAY, DEFAULT_SERVICE_NAME,
};

// Port traits
pub use ports::{ConfigProvider, LanDiscoveryApi, MdnsProtocol, PeerEventSender};

// Service
pub use service::{LanDiscover, PeerEventBus};

// Adapters
pub use adapters::{apply_env_overrides, StaticConfigProvider};

#[cfg(feature = "toml-config")]
pub use adapters::TomlConfigProvider;

#[cfg(feature = "mdns")]
pub use adapters::MdnsSdProtocol;

// Bus types callers hold
pub use shared_bus::{Subscription, SubscriptionError};

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::StubProtocol;
