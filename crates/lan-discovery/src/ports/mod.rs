//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** the API a session exposes to the host
//! - **Driven Ports (Outbound):** the protocol backend and config source a
//!   session requires

pub mod inbound;
pub mod outbound;

pub use inbound::LanDiscoveryApi;
pub use outbound::{ConfigProvider, MdnsProtocol, PeerEventSender};
