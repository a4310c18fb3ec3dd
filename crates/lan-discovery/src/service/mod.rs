//! # LAN Discovery Service
//!
//! The coordination layer on top of an [`MdnsProtocol`] backend:
//!
//! - **Registration loop:** advertises this node, re-advertising every cycle
//! - **Resolution relay:** moves resolved peers from the backend queue onto
//!   the fan-out bus, in arrival order
//! - **Subscription gate:** hands out subscriptions and activates the
//!   resolver exactly once
//! - **Lifecycle:** one stop signal for both loops, then protocol and bus
//!   release
//!
//! [`MdnsProtocol`]: crate::ports::MdnsProtocol

mod api;
mod core;
mod registration;
mod relay;

pub use core::{LanDiscover, PeerEventBus};

use tokio::sync::watch;

/// Resolve once the stop signal is raised.
///
/// A dropped sender counts as stop.
pub(crate) async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopped| *stopped).await;
}
