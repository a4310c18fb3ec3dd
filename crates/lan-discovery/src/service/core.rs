use parking_lot::Mutex;
use shared_bus::{EventBus, InMemoryEventBus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::{LanDiscoveryConfig, LanDiscoveryError, LanPeerEvent, ServiceIdentity};
use crate::ports::{MdnsProtocol, PeerEventSender};
use crate::service::registration::RegistrationLoop;
use crate::service::relay::ResolutionRelay;

/// Fan-out bus type the session publishes to.
pub type PeerEventBus = dyn EventBus<LanPeerEvent>;

/// A running LAN discovery session.
///
/// Construction starts two background tasks:
/// - the registration loop, advertising this node every `register_cycle`
/// - the resolution relay, moving resolved peers onto the fan-out bus
///
/// Peer resolution itself starts on the first [`subscribe`] call.
///
/// # Example
///
/// ```rust,ignore
/// use lan_discovery::{LanDiscover, LanDiscoveryApi, LanDiscoveryConfig};
///
/// let session = LanDiscover::new(LanDiscoveryConfig::new(4000), protocol)?;
/// let mut peers = session.subscribe()?;
/// while let Some(peer) = peers.recv().await {
///     println!("peer at {peer}");
/// }
/// session.stop().await;
/// ```
///
/// [`subscribe`]: crate::ports::LanDiscoveryApi::subscribe
pub struct LanDiscover {
    /// Advertised and resolved identity
    pub(crate) identity: ServiceIdentity,
    /// Protocol backend
    pub(crate) protocol: Arc<dyn MdnsProtocol>,
    /// Fan-out bus shared by the relay and every subscription
    pub(crate) event_bus: Arc<PeerEventBus>,
    /// Producer side of the resolver → relay queue, handed to the resolver
    pub(crate) entries: PeerEventSender,
    /// Set once, by the subscriber that activates the resolver
    pub(crate) resolving: AtomicBool,
    /// Set once, by the first `stop()`
    pub(crate) stopped: AtomicBool,
    /// Stop signal observed by both loops
    pub(crate) shutdown_tx: watch::Sender<bool>,
    /// Background loops, taken and joined by `stop()`
    pub(crate) tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl LanDiscover {
    /// Start a session publishing to a fresh in-memory bus.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: LanDiscoveryConfig,
        protocol: Arc<dyn MdnsProtocol>,
    ) -> Result<Self, LanDiscoveryError> {
        Self::with_event_bus(config, protocol, Arc::new(InMemoryEventBus::new()))
    }

    /// Start a session publishing to the given bus.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_event_bus(
        config: LanDiscoveryConfig,
        protocol: Arc<dyn MdnsProtocol>,
        event_bus: Arc<PeerEventBus>,
    ) -> Result<Self, LanDiscoveryError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| LanDiscoveryError::NoRuntime)?;

        let identity = config.identity();
        let (entries, entries_rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let registration = RegistrationLoop {
            protocol: Arc::clone(&protocol),
            identity: identity.clone(),
            port: config.service_port,
            cycle: config.register_cycle,
            delay: config.register_delay,
            shutdown: shutdown_rx.clone(),
        };
        let relay = ResolutionRelay {
            entries: entries_rx,
            event_bus: Arc::clone(&event_bus),
            shutdown: shutdown_rx,
        };

        let tasks = vec![runtime.spawn(registration.run()), runtime.spawn(relay.run())];

        info!(
            instance = identity.instance(),
            service = identity.service(),
            domain = identity.domain(),
            port = config.service_port,
            "LAN discovery started"
        );

        Ok(Self {
            identity,
            protocol,
            event_bus,
            entries,
            resolving: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            shutdown_tx,
            tasks: Mutex::new(tasks),
        })
    }

    /// Whether `stop()` has been called.
    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Drop for LanDiscover {
    /// Best-effort stop: signals the loops and releases the protocol but
    /// cannot wait for the loops to finish.
    fn drop(&mut self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("LAN discovery dropped without stop()");
        self.shutdown_tx.send_replace(true);
        self.protocol.stop_advertising();
        self.protocol.stop_resolver();
        self.event_bus.shutdown();
    }
}
