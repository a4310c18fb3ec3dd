use async_trait::async_trait;
use lan_telemetry::{metric_inc, RESOLVER_ACTIVATIONS, SUBSCRIPTIONS_CREATED};
use shared_bus::{EventBus, EventSubscriber, Subscription, SubscriptionError};
use std::sync::atomic::Ordering;
use tracing::{debug, error, info, warn};

use crate::domain::{LanDiscoveryError, LanPeerEvent};
use crate::ports::LanDiscoveryApi;
use crate::service::LanDiscover;

#[async_trait]
impl LanDiscoveryApi for LanDiscover {
    fn subscribe(&self) -> Result<Subscription<LanPeerEvent>, LanDiscoveryError> {
        let subscription = self.event_bus.subscribe()?;

        if self
            .resolving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            if self.is_stopped() {
                return Err(SubscriptionError::Closed.into());
            }

            if let Err(e) = self.protocol.activate_resolver(
                self.entries.clone(),
                self.identity.service(),
                self.identity.domain(),
            ) {
                // The flag stays set: activation is not retried this session.
                error!(
                    service = self.identity.service(),
                    domain = self.identity.domain(),
                    error = %e,
                    "Resolver activation failed"
                );
                return Err(LanDiscoveryError::ResolverActivation(e));
            }

            // Lost a race with stop(); release what was just started.
            if self.is_stopped() {
                self.protocol.stop_resolver();
                return Err(SubscriptionError::Closed.into());
            }

            metric_inc!(RESOLVER_ACTIVATIONS);
            info!(
                service = self.identity.service(),
                domain = self.identity.domain(),
                "Peer resolution activated"
            );
        }

        metric_inc!(SUBSCRIPTIONS_CREATED);
        debug!("Subscription created");
        Ok(subscription)
    }

    async fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            debug!("LAN discovery already stopped");
            return;
        }

        self.shutdown_tx.send_replace(true);

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Discovery loop ended abnormally");
            }
        }

        self.protocol.stop_advertising();
        self.protocol.stop_resolver();
        self.event_bus.shutdown();

        info!(instance = self.identity.instance(), "LAN discovery stopped");
    }
}
