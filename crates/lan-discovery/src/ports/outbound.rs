//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces a discovery session **requires** from its
//! environment: a protocol backend and a source of configuration.

use tokio::sync::mpsc;

use crate::domain::{LanDiscoveryConfig, LanPeerEvent, ProtocolError, ServiceIdentity};

/// Queue handed to the protocol backend on resolver activation.
///
/// Bounded. A backend that outruns the relay waits on `send` instead of
/// dropping events.
pub type PeerEventSender = mpsc::Sender<LanPeerEvent>;

/// Abstract LAN service-discovery protocol (e.g. multicast DNS).
///
/// The session drives it; the backend owns sockets, records and caches.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the registration loop, the
/// subscription gate and `stop()` call it from different tasks.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct LoggingProtocol;
///
/// impl MdnsProtocol for LoggingProtocol {
///     fn advertise(&self, identity: &ServiceIdentity, port: u16) -> Result<(), ProtocolError> {
///         tracing::info!(instance = identity.instance(), port, "advertise");
///         Ok(())
///     }
///     // ...
/// }
/// ```
pub trait MdnsProtocol: Send + Sync {
    /// Begin advertising `identity` at `port`.
    fn advertise(&self, identity: &ServiceIdentity, port: u16) -> Result<(), ProtocolError>;

    /// Begin delivering peers found for `service`/`domain` into `sink`.
    ///
    /// Called at most once per session.
    fn activate_resolver(
        &self,
        sink: PeerEventSender,
        service: &str,
        domain: &str,
    ) -> Result<(), ProtocolError>;

    /// Withdraw the current advertisement. Idempotent, returns promptly.
    fn stop_advertising(&self);

    /// Stop delivering peers. Idempotent, returns promptly.
    fn stop_resolver(&self);
}

/// Abstract interface for configuration loading.
///
/// Allows different configuration sources (file, static values, etc.)
pub trait ConfigProvider: Send + Sync {
    /// Session configuration.
    fn lan_discovery_config(&self) -> LanDiscoveryConfig;
}
