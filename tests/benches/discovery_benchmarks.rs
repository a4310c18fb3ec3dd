//! # LAN Discovery Benchmarks
//!
//! | Path | Measures |
//! |------|----------|
//! | Fan-out bus | publish to N subscribers and drain |
//! | Session relay | resolver queue → relay → subscriber, end to end |
//! | Subscription gate | subscribe after activation |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

use lan_discovery::{LanDiscover, LanDiscoveryApi, LanDiscoveryConfig, LanPeerEvent, StubProtocol};
use shared_bus::{EventPublisher, EventSubscriber, InMemoryEventBus};

const BATCH: usize = 500;

fn peer(i: usize) -> LanPeerEvent {
    LanPeerEvent::single(IpAddr::V4(Ipv4Addr::new(10, 0, (i >> 8) as u8, i as u8)), 4000)
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("benchmark runtime")
}

// ============================================================================
// Fan-out bus
// ============================================================================

fn bench_bus_fan_out(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("bus-fan-out");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(BATCH as u64));

    for subscribers in [1usize, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, &subscribers| {
                b.iter(|| {
                    rt.block_on(async {
                        let bus = InMemoryEventBus::with_capacity(BATCH);
                        let mut subs: Vec<_> = (0..subscribers)
                            .map(|_| bus.subscribe().expect("subscribe"))
                            .collect();
                        for i in 0..BATCH {
                            black_box(bus.publish(peer(i)).await.expect("publish"));
                        }
                        for sub in &mut subs {
                            for _ in 0..BATCH {
                                black_box(sub.recv().await);
                            }
                        }
                    })
                })
            },
        );
    }
    group.finish();
}

// ============================================================================
// Session relay
// ============================================================================

fn bench_session_relay(c: &mut Criterion) {
    let rt = runtime();
    let stub = Arc::new(StubProtocol::new());
    let session = rt
        .block_on(async { LanDiscover::new(LanDiscoveryConfig::for_testing(4000), stub.clone()) })
        .expect("session");
    let mut subscription = session.subscribe().expect("subscribe");

    let mut group = c.benchmark_group("session-relay");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(BATCH as u64));

    group.bench_function("emit_and_receive", |b| {
        b.iter(|| {
            rt.block_on(async {
                for i in 0..BATCH {
                    stub.emit(peer(i)).await;
                    black_box(subscription.recv().await);
                }
            })
        })
    });
    group.finish();

    rt.block_on(session.stop());
}

// ============================================================================
// Subscription gate
// ============================================================================

fn bench_subscribe(c: &mut Criterion) {
    let rt = runtime();
    let stub = Arc::new(StubProtocol::new());
    let session = rt
        .block_on(async { LanDiscover::new(LanDiscoveryConfig::for_testing(4000), stub.clone()) })
        .expect("session");
    drop(session.subscribe().expect("activate"));

    c.bench_function("subscribe_after_activation", |b| {
        b.iter(|| black_box(session.subscribe().expect("subscribe")))
    });

    rt.block_on(session.stop());
}

criterion_group!(benches, bench_bus_fan_out, bench_session_relay, bench_subscribe);
criterion_main!(benches);
