//! Core domain entities for LAN discovery

use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// One discovered service instance on the LAN.
///
/// A peer may be multi-homed, so a single event carries every address the
/// protocol resolved for it. The port applies to all of them.
///
/// # Invariant
///
/// `ips` is never empty. Use [`LanPeerEvent::new`] to construct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanPeerEvent {
    ips: Vec<IpAddr>,
    port: u16,
}

impl LanPeerEvent {
    /// Create an event, or `None` if no address was resolved.
    #[must_use]
    pub fn new(ips: Vec<IpAddr>, port: u16) -> Option<Self> {
        if ips.is_empty() {
            return None;
        }
        Some(Self { ips, port })
    }

    /// Create an event for a single address.
    #[must_use]
    pub fn single(ip: IpAddr, port: u16) -> Self {
        Self { ips: vec![ip], port }
    }

    /// Addresses in the order the protocol reported them.
    #[must_use]
    pub fn ips(&self) -> &[IpAddr] {
        &self.ips
    }

    /// Service port shared by every address.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Every `ip:port` pair of this peer.
    pub fn socket_addrs(&self) -> impl Iterator<Item = SocketAddr> + '_ {
        self.ips.iter().map(move |ip| SocketAddr::new(*ip, self.port))
    }
}

impl fmt::Display for LanPeerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, ip) in self.ips.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{ip}")?;
        }
        write!(f, "]:{}", self.port)
    }
}

/// What is being advertised and resolved.
///
/// Fixed for the lifetime of a discovery session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceIdentity {
    instance: String,
    service: String,
    domain: String,
}

impl ServiceIdentity {
    pub fn new(
        instance: impl Into<String>,
        service: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            instance: instance.into(),
            service: service.into(),
            domain: domain.into(),
        }
    }

    /// Instance name of this node.
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Service name shared by all peers.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Discovery domain, usually `local`.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}
