//! Test utilities for LAN discovery.
//!
//! An in-memory protocol backend that records every call and lets tests
//! inject failures and resolved peers. Enable with the `test-utils` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use lan_discovery::test_utils::StubProtocol;
//!
//! let stub = Arc::new(StubProtocol::new().with_initial_events(vec![peer]));
//! let session = LanDiscover::new(LanDiscoveryConfig::for_testing(4000), stub.clone())?;
//! let mut subscription = session.subscribe()?;
//! assert_eq!(subscription.recv().await, Some(peer));
//! assert_eq!(stub.activate_calls(), 1);
//! ```

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::domain::{LanPeerEvent, ProtocolError, ServiceIdentity};
use crate::ports::{MdnsProtocol, PeerEventSender};

/// Recording protocol backend.
#[derive(Debug, Default)]
pub struct StubProtocol {
    advertise_calls: AtomicUsize,
    activate_calls: AtomicUsize,
    stop_advertising_calls: AtomicUsize,
    stop_resolver_calls: AtomicUsize,
    /// 1-based advertise call numbers that fail
    failing_advertise_calls: HashSet<usize>,
    fail_activation: AtomicBool,
    initial_events: Vec<LanPeerEvent>,
    last_advertised: Mutex<Option<(ServiceIdentity, u16)>>,
    sink: Mutex<Option<PeerEventSender>>,
}

impl StubProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given advertise attempts (1 is the initial advertisement).
    #[must_use]
    pub fn failing_advertise_on(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_advertise_calls.extend(calls);
        self
    }

    /// Refuse every resolver activation.
    #[must_use]
    pub fn failing_activation(self) -> Self {
        self.fail_activation.store(true, Ordering::SeqCst);
        self
    }

    /// Events pushed into the queue as soon as the resolver is activated.
    #[must_use]
    pub fn with_initial_events(mut self, events: Vec<LanPeerEvent>) -> Self {
        self.initial_events = events;
        self
    }

    /// Deliver a peer as if the resolver had found it.
    ///
    /// Returns `false` if the resolver is not active or the session dropped
    /// its queue.
    pub async fn emit(&self, event: LanPeerEvent) -> bool {
        let sink = self.sink.lock().clone();
        match sink {
            Some(sink) => sink.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Whether the resolver is currently delivering.
    pub fn is_resolving(&self) -> bool {
        self.sink.lock().is_some()
    }

    pub fn advertise_calls(&self) -> usize {
        self.advertise_calls.load(Ordering::SeqCst)
    }

    pub fn activate_calls(&self) -> usize {
        self.activate_calls.load(Ordering::SeqCst)
    }

    pub fn stop_advertising_calls(&self) -> usize {
        self.stop_advertising_calls.load(Ordering::SeqCst)
    }

    pub fn stop_resolver_calls(&self) -> usize {
        self.stop_resolver_calls.load(Ordering::SeqCst)
    }

    /// Identity and port of the last advertise call.
    pub fn last_advertised(&self) -> Option<(ServiceIdentity, u16)> {
        self.last_advertised.lock().clone()
    }
}

impl MdnsProtocol for StubProtocol {
    fn advertise(&self, identity: &ServiceIdentity, port: u16) -> Result<(), ProtocolError> {
        let call = self.advertise_calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_advertised.lock() = Some((identity.clone(), port));
        if self.failing_advertise_calls.contains(&call) {
            return Err(ProtocolError::Advertise(format!("stub failure on call {call}")));
        }
        Ok(())
    }

    fn activate_resolver(
        &self,
        sink: PeerEventSender,
        _service: &str,
        _domain: &str,
    ) -> Result<(), ProtocolError> {
        self.activate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_activation.load(Ordering::SeqCst) {
            return Err(ProtocolError::Resolver("stub activation refused".into()));
        }
        for event in &self.initial_events {
            if sink.try_send(event.clone()).is_err() {
                break;
            }
        }
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    fn stop_advertising(&self) {
        self.stop_advertising_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_resolver(&self) {
        self.stop_resolver_calls.fetch_add(1, Ordering::SeqCst);
        self.sink.lock().take();
    }
}
