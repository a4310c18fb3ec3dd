use lan_telemetry::{metric_inc, PEER_EVENTS_RELAYED, PUBLISH_FAILURES};
use shared_bus::EventPublisher;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, trace};

use crate::domain::LanPeerEvent;
use crate::service::core::PeerEventBus;
use crate::service::shutdown_signalled;

/// Single consumer of the resolver queue.
///
/// Publishes in arrival order. On stop, an in-flight publish is abandoned
/// and queued events are dropped.
pub(crate) struct ResolutionRelay {
    pub(crate) entries: mpsc::Receiver<LanPeerEvent>,
    pub(crate) event_bus: Arc<PeerEventBus>,
    pub(crate) shutdown: watch::Receiver<bool>,
}

impl ResolutionRelay {
    pub(crate) async fn run(self) {
        let Self {
            mut entries,
            event_bus,
            mut shutdown,
        } = self;

        loop {
            let entry = tokio::select! {
                biased;
                _ = shutdown_signalled(&mut shutdown) => {
                    debug!(dropped = entries.len(), "Resolution relay stopped");
                    return;
                }
                entry = entries.recv() => entry,
            };

            let Some(event) = entry else {
                debug!("Resolver queue closed, resolution relay exiting");
                return;
            };

            let published = tokio::select! {
                biased;
                _ = shutdown_signalled(&mut shutdown) => {
                    debug!(
                        dropped = entries.len() + 1,
                        "Resolution relay stopped during publish"
                    );
                    return;
                }
                published = event_bus.publish(event) => published,
            };

            match published {
                Ok(receivers) => {
                    metric_inc!(PEER_EVENTS_RELAYED);
                    trace!(receivers, "Peer relayed");
                }
                Err(e) => {
                    metric_inc!(PUBLISH_FAILURES);
                    error!(error = %e, "Failed to publish peer");
                }
            }
        }
    }
}
