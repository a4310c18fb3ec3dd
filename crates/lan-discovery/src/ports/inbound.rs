//! # Driving Ports (Inbound API)
//!
//! The public API a discovery session exposes to the host process.

use async_trait::async_trait;
use shared_bus::Subscription;

use crate::domain::{LanDiscoveryError, LanPeerEvent};

/// Primary API of a discovery session.
///
/// # Example
///
/// ```rust,ignore
/// use lan_discovery::ports::LanDiscoveryApi;
///
/// async fn first_peer<T: LanDiscoveryApi>(api: &T) -> Option<LanPeerEvent> {
///     let mut subscription = api.subscribe().ok()?;
///     subscription.recv().await
/// }
/// ```
#[async_trait]
pub trait LanDiscoveryApi: Send + Sync {
    /// Receive every peer discovered from now on.
    ///
    /// The first call also starts peer resolution. Each subscription gets
    /// its own copy of every event.
    ///
    /// # Errors
    ///
    /// - `Subscription` if the session is stopped
    /// - `ResolverActivation` if this call started resolution and the
    ///   protocol refused; later calls succeed without retrying activation
    fn subscribe(&self) -> Result<Subscription<LanPeerEvent>, LanDiscoveryError>;

    /// Stop advertising and resolving, wait for the background loops, and
    /// close every subscription.
    ///
    /// Calling it again is a no-op.
    async fn stop(&self);
}
