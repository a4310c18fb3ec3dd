//! # Multicast DNS Backend
//!
//! [`MdnsProtocol`] on top of the `mdns-sd` daemon.
//!
//! The daemon runs its own thread. Resolved peers are forwarded from the
//! browse channel to the session queue by a dedicated OS thread, so a full
//! queue blocks that thread and never a tokio worker.

use mdns_sd::{ResolvedService, ServiceDaemon, ServiceEvent, ServiceInfo};
use parking_lot::Mutex;
use std::net::IpAddr;
use tracing::{debug, info, trace, warn};

use crate::domain::{LanPeerEvent, ProtocolError, ServiceIdentity};
use crate::ports::{MdnsProtocol, PeerEventSender};

/// Name of the thread forwarding resolved peers.
const RESOLVER_THREAD_NAME: &str = "lan-mdns-resolver";

/// `_<service>._udp.<domain>.`
pub fn service_type(service: &str, domain: &str) -> String {
    format!("_{service}._udp.{}.", domain.trim_end_matches('.'))
}

/// Host name advertised for this machine.
fn local_host_name() -> String {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string());
    format!("{hostname}.local.")
}

/// Convert a resolved service into a peer event.
///
/// Addresses are sorted so repeated resolutions of the same peer compare
/// equal. `None` if nothing was resolved.
pub fn to_peer_event(
    addresses: impl IntoIterator<Item = IpAddr>,
    port: u16,
) -> Option<LanPeerEvent> {
    let mut ips: Vec<IpAddr> = addresses.into_iter().collect();
    ips.sort();
    ips.dedup();
    LanPeerEvent::new(ips, port)
}

fn resolved_to_event(resolved: &ResolvedService) -> Option<LanPeerEvent> {
    to_peer_event(
        resolved.get_addresses().iter().map(|a| a.to_ip_addr()),
        resolved.get_port(),
    )
}

/// Multicast DNS protocol backend.
pub struct MdnsSdProtocol {
    daemon: ServiceDaemon,
    /// Full name of the current registration
    registered: Mutex<Option<String>>,
    /// Service type being browsed
    browsing: Mutex<Option<String>>,
}

impl MdnsSdProtocol {
    /// Start the mDNS daemon.
    pub fn new() -> Result<Self, ProtocolError> {
        let daemon = ServiceDaemon::new().map_err(|e| ProtocolError::Daemon(e.to_string()))?;
        Ok(Self {
            daemon,
            registered: Mutex::new(None),
            browsing: Mutex::new(None),
        })
    }
}

impl MdnsProtocol for MdnsSdProtocol {
    fn advertise(&self, identity: &ServiceIdentity, port: u16) -> Result<(), ProtocolError> {
        let ty = service_type(identity.service(), identity.domain());
        let host = local_host_name();
        let properties: [(&str, &str); 0] = [];

        let info = ServiceInfo::new(&ty, identity.instance(), &host, "", port, &properties[..])
            .map_err(|e| ProtocolError::Advertise(e.to_string()))?
            .enable_addr_auto();
        let fullname = info.get_fullname().to_string();

        self.daemon
            .register(info)
            .map_err(|e| ProtocolError::Advertise(e.to_string()))?;

        debug!(fullname, host, port, "mDNS service registered");
        *self.registered.lock() = Some(fullname);
        Ok(())
    }

    fn activate_resolver(
        &self,
        sink: PeerEventSender,
        service: &str,
        domain: &str,
    ) -> Result<(), ProtocolError> {
        let ty = service_type(service, domain);
        let receiver = self
            .daemon
            .browse(&ty)
            .map_err(|e| ProtocolError::Resolver(e.to_string()))?;

        let thread_ty = ty.clone();
        let spawned = std::thread::Builder::new()
            .name(RESOLVER_THREAD_NAME.into())
            .spawn(move || {
                debug!(service_type = thread_ty, "mDNS resolver thread started");
                while let Ok(event) = receiver.recv() {
                    match event {
                        ServiceEvent::ServiceResolved(resolved) => {
                            let Some(peer) = resolved_to_event(&resolved) else {
                                trace!(
                                    fullname = resolved.get_fullname(),
                                    "Resolved without addresses"
                                );
                                continue;
                            };
                            if sink.blocking_send(peer).is_err() {
                                break;
                            }
                        }
                        ServiceEvent::SearchStopped(_) => break,
                        _ => {}
                    }
                }
                debug!(service_type = thread_ty, "mDNS resolver thread stopped");
            });

        if let Err(e) = spawned {
            let _ = self.daemon.stop_browse(&ty);
            return Err(ProtocolError::Resolver(format!(
                "failed to spawn resolver thread: {e}"
            )));
        }

        info!(service_type = ty, "mDNS browse started");
        *self.browsing.lock() = Some(ty);
        Ok(())
    }

    fn stop_advertising(&self) {
        let Some(fullname) = self.registered.lock().take() else {
            return;
        };
        if let Err(e) = self.daemon.unregister(&fullname) {
            warn!(fullname, error = %e, "mDNS unregister failed");
        }
    }

    fn stop_resolver(&self) {
        let Some(ty) = self.browsing.lock().take() else {
            return;
        };
        if let Err(e) = self.daemon.stop_browse(&ty) {
            debug!(service_type = ty, error = %e, "mDNS stop_browse failed");
        }
    }
}

impl Drop for MdnsSdProtocol {
    fn drop(&mut self) {
        if let Err(e) = self.daemon.shutdown() {
            debug!(error = %e, "mDNS daemon shutdown failed");
        }
    }
}
