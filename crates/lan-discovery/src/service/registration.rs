use lan_telemetry::{metric_inc, ADVERTISEMENTS, ADVERTISE_FAILURES};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::domain::ServiceIdentity;
use crate::ports::MdnsProtocol;
use crate::service::shutdown_signalled;

/// Keeps this node advertised until stop.
///
/// Any advertise failure ends the loop; the session keeps resolving.
pub(crate) struct RegistrationLoop {
    pub(crate) protocol: Arc<dyn MdnsProtocol>,
    pub(crate) identity: ServiceIdentity,
    pub(crate) port: u16,
    pub(crate) cycle: Duration,
    pub(crate) delay: Duration,
    pub(crate) shutdown: watch::Receiver<bool>,
}

impl RegistrationLoop {
    pub(crate) async fn run(self) {
        let Self {
            protocol,
            identity,
            port,
            cycle,
            delay,
            mut shutdown,
        } = self;

        if !delay.is_zero() {
            tokio::select! {
                biased;
                _ = shutdown_signalled(&mut shutdown) => {
                    debug!("Registration loop stopped before first advertisement");
                    return;
                }
                _ = sleep(delay) => {}
            }
        }

        if !advertise(protocol.as_ref(), &identity, port, "initial") {
            return;
        }

        let mut ticker = interval_at(Instant::now() + cycle, cycle);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_signalled(&mut shutdown) => {
                    debug!("Registration loop stopped");
                    return;
                }
                _ = ticker.tick() => {
                    protocol.stop_advertising();
                    if !advertise(protocol.as_ref(), &identity, port, "periodic") {
                        return;
                    }
                }
            }
        }
    }
}

/// Advertise once, reporting the outcome. Returns whether it succeeded.
fn advertise(
    protocol: &dyn MdnsProtocol,
    identity: &ServiceIdentity,
    port: u16,
    kind: &'static str,
) -> bool {
    match protocol.advertise(identity, port) {
        Ok(()) => {
            metric_inc!(ADVERTISEMENTS);
            info!(
                instance = identity.instance(),
                service = identity.service(),
                port,
                kind,
                "Service advertised"
            );
            true
        }
        Err(e) => {
            metric_inc!(ADVERTISE_FAILURES);
            error!(
                instance = identity.instance(),
                service = identity.service(),
                port,
                kind,
                error = %e,
                "Advertisement failed, registration loop exiting"
            );
            false
        }
    }
}
