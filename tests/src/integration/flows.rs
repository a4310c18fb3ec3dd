//! # Integration Test Flows
//!
//! A discovery session wired to the in-memory fan-out bus and the stub
//! protocol backend.
//!
//! ## Flows Tested:
//!
//! 1. **Config → session**: TOML file and static providers start a session
//! 2. **Resolver → subscribers**: every subscriber sees every later peer, in order
//! 3. **Backpressure**: a full queue holds the resolver back instead of dropping
//! 4. **Stop**: subscriptions end, the backend is released

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Semaphore;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use lan_discovery::{
        ConfigProvider, LanDiscover, LanDiscoveryApi, LanDiscoveryConfig, LanPeerEvent,
        ServiceIdentity, StaticConfigProvider, StubProtocol, Subscription, TomlConfigProvider,
    };
    use shared_bus::{
        EventBus, EventPublisher, EventSubscriber, InMemoryEventBus, PublishError,
        SubscriptionError,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn peer(last: u8) -> LanPeerEvent {
        LanPeerEvent::single(IpAddr::V4(Ipv4Addr::new(192, 168, 1, last)), 4000)
    }

    async fn next(subscription: &mut Subscription<LanPeerEvent>) -> Option<LanPeerEvent> {
        timeout(Duration::from_secs(2), subscription.recv())
            .await
            .ok()
            .flatten()
    }

    /// Bus whose publishes each wait for a permit.
    struct GatedBus {
        inner: InMemoryEventBus<LanPeerEvent>,
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl EventPublisher<LanPeerEvent> for GatedBus {
        async fn publish(&self, event: LanPeerEvent) -> Result<usize, PublishError> {
            let permit = self.gate.acquire().await.map_err(|_| PublishError::Closed)?;
            permit.forget();
            self.inner.publish(event).await
        }

        fn events_published(&self) -> u64 {
            self.inner.events_published()
        }
    }

    impl EventSubscriber<LanPeerEvent> for GatedBus {
        fn subscribe(&self) -> Result<Subscription<LanPeerEvent>, SubscriptionError> {
            self.inner.subscribe()
        }
    }

    impl EventBus<LanPeerEvent> for GatedBus {
        fn shutdown(&self) {
            self.inner.shutdown();
        }

        fn is_shut_down(&self) -> bool {
            self.inner.is_shut_down()
        }
    }

    // =============================================================================
    // CONFIG → SESSION
    // =============================================================================

    #[tokio::test]
    async fn test_session_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[lan_discovery]\ninstance_name = \"node-a\"\nservice_name = \"chat\"\nservice_port = 4100"
        )
        .unwrap();

        let provider = TomlConfigProvider::load(file.path()).unwrap();
        let stub = Arc::new(StubProtocol::new().with_initial_events(vec![peer(7)]));
        let session = LanDiscover::new(provider.lan_discovery_config(), stub.clone()).unwrap();

        let mut subscription = session.subscribe().unwrap();
        assert_eq!(next(&mut subscription).await, Some(peer(7)));

        timeout(Duration::from_secs(2), async {
            while stub.advertise_calls() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(
            stub.last_advertised(),
            Some((ServiceIdentity::new("node-a", "chat", "local"), 4100))
        );

        session.stop().await;
    }

    #[tokio::test]
    async fn test_session_from_static_provider() {
        let provider = StaticConfigProvider::new(LanDiscoveryConfig::for_testing(4000));
        let stub = Arc::new(StubProtocol::new());
        let session = LanDiscover::new(provider.lan_discovery_config(), stub.clone()).unwrap();

        session.subscribe().unwrap();
        assert_eq!(stub.activate_calls(), 1);
        session.stop().await;
    }

    // =============================================================================
    // RESOLVER → SUBSCRIBERS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fan_out_to_concurrent_subscribers() {
        let stub = Arc::new(StubProtocol::new());
        let session = LanDiscover::new(LanDiscoveryConfig::for_testing(4000), stub.clone()).unwrap();

        let collectors: Vec<_> = (0..8)
            .map(|_| {
                let mut subscription = session.subscribe().unwrap();
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    while seen.len() < 100 {
                        match timeout(Duration::from_secs(5), subscription.recv()).await {
                            Ok(Some(event)) => seen.push(event),
                            _ => break,
                        }
                    }
                    seen
                })
            })
            .collect();

        for i in 0..100u8 {
            assert!(stub.emit(peer(i)).await);
        }

        let expected: Vec<_> = (0..100u8).map(peer).collect();
        for collector in collectors {
            assert_eq!(collector.await.unwrap(), expected);
        }
        assert_eq!(stub.activate_calls(), 1);
        session.stop().await;
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_only_later_peers() {
        let stub = Arc::new(StubProtocol::new());
        let session = LanDiscover::new(LanDiscoveryConfig::for_testing(4000), stub.clone()).unwrap();

        let mut early = session.subscribe().unwrap();
        assert!(stub.emit(peer(1)).await);
        assert_eq!(next(&mut early).await, Some(peer(1)));

        let mut late = session.subscribe().unwrap();
        assert!(stub.emit(peer(2)).await);
        assert_eq!(next(&mut late).await, Some(peer(2)));
        assert_eq!(next(&mut early).await, Some(peer(2)));

        session.stop().await;
    }

    #[tokio::test]
    async fn test_dropped_subscription_does_not_affect_others() {
        let stub = Arc::new(StubProtocol::new());
        let session = LanDiscover::new(LanDiscoveryConfig::for_testing(4000), stub.clone()).unwrap();

        let dropped = session.subscribe().unwrap();
        let mut kept = session.subscribe().unwrap();
        drop(dropped);

        assert!(stub.emit(peer(3)).await);
        assert_eq!(next(&mut kept).await, Some(peer(3)));
        session.stop().await;
    }

    #[tokio::test]
    async fn test_subscription_as_stream_ends_on_stop() {
        let stub = Arc::new(StubProtocol::new());
        let session = LanDiscover::new(LanDiscoveryConfig::for_testing(4000), stub.clone()).unwrap();
        let mut stream = session.subscribe().unwrap().into_stream();

        for i in 1..=3 {
            assert!(stub.emit(peer(i)).await);
        }
        for i in 1..=3 {
            let event = timeout(Duration::from_secs(2), stream.next()).await.unwrap();
            assert_eq!(event, Some(peer(i)));
        }

        session.stop().await;
        let end = timeout(Duration::from_secs(2), stream.next()).await.unwrap();
        assert_eq!(end, None);
    }

    // =============================================================================
    // BACKPRESSURE
    // =============================================================================

    #[tokio::test]
    async fn test_full_queue_holds_back_the_resolver() {
        let gate = Arc::new(Semaphore::new(0));
        let bus = Arc::new(GatedBus {
            inner: InMemoryEventBus::new(),
            gate: Arc::clone(&gate),
        });
        let stub = Arc::new(StubProtocol::new());
        let config = LanDiscoveryConfig::for_testing(4000).with_queue_capacity(1);
        let session = LanDiscover::with_event_bus(config, stub.clone(), bus).unwrap();
        let mut subscription = session.subscribe().unwrap();

        // The relay takes the first peer and waits at the gate; the second
        // fills the queue.
        assert!(stub.emit(peer(1)).await);
        assert!(stub.emit(peer(2)).await);
        assert!(timeout(Duration::from_millis(100), stub.emit(peer(3)))
            .await
            .is_err());

        gate.add_permits(10);
        assert!(stub.emit(peer(3)).await);

        for i in 1..=3 {
            assert_eq!(next(&mut subscription).await, Some(peer(i)));
        }
        session.stop().await;
    }

    // =============================================================================
    // STOP
    // =============================================================================

    #[tokio::test]
    async fn test_stop_releases_backend_and_ends_subscriptions() {
        let stub = Arc::new(StubProtocol::new());
        let session = LanDiscover::new(LanDiscoveryConfig::for_testing(4000), stub.clone()).unwrap();
        let mut first = session.subscribe().unwrap();
        let mut second = session.subscribe().unwrap();

        timeout(Duration::from_secs(2), session.stop()).await.unwrap();

        assert_eq!(next(&mut first).await, None);
        assert_eq!(next(&mut second).await, None);
        assert!(!stub.is_resolving());
        assert_eq!(stub.stop_advertising_calls(), 1);
        assert!(!stub.emit(peer(9)).await);
        assert!(session.subscribe().is_err());
    }

    #[tokio::test]
    async fn test_stop_returns_while_publish_is_stalled() {
        let gate = Arc::new(Semaphore::new(0));
        let bus = Arc::new(GatedBus {
            inner: InMemoryEventBus::new(),
            gate: Arc::clone(&gate),
        });
        let stub = Arc::new(StubProtocol::new());
        let config = LanDiscoveryConfig::for_testing(4000).with_queue_capacity(1);
        let session = LanDiscover::with_event_bus(config, stub.clone(), bus.clone()).unwrap();
        let mut subscription = session.subscribe().unwrap();

        // The second send only completes once the relay holds the first
        // peer, which then waits at the closed gate.
        assert!(stub.emit(peer(1)).await);
        assert!(stub.emit(peer(2)).await);

        timeout(Duration::from_secs(3), session.stop())
            .await
            .expect("stop must not wait for a stalled publish");

        gate.add_permits(10);
        tokio::task::yield_now().await;
        assert_eq!(bus.events_published(), 0);
        assert_eq!(next(&mut subscription).await, None);
    }

    #[tokio::test]
    async fn test_stop_discards_queued_peers() {
        let gate = Arc::new(Semaphore::new(0));
        let bus = Arc::new(GatedBus {
            inner: InMemoryEventBus::new(),
            gate: Arc::clone(&gate),
        });
        let stub = Arc::new(StubProtocol::new());
        let config = LanDiscoveryConfig::for_testing(4000).with_queue_capacity(4);
        let session = LanDiscover::with_event_bus(config, stub.clone(), bus.clone()).unwrap();
        let mut subscription = session.subscribe().unwrap();

        // Five sends into a queue of four: the relay holds peer 1 at the
        // gate and peers 2..=5 stay queued.
        for i in 1..=5 {
            assert!(stub.emit(peer(i)).await);
        }
        let published_before = bus.events_published();

        timeout(Duration::from_secs(3), session.stop()).await.unwrap();

        gate.add_permits(10);
        tokio::task::yield_now().await;
        assert_eq!(bus.events_published(), published_before);
        assert_eq!(published_before, 0);
        assert_eq!(next(&mut subscription).await, None);
        assert!(!stub.emit(peer(6)).await);
    }
}
