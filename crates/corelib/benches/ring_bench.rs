use corelib::{BasicEndpoint, Ring};
use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn build_ring(endpoint_count: usize, load_factor: f64) -> Ring {
    let ring = Ring::builder()
        .load_factor(load_factor)
        .build()
        .expect("valid load factor");
    for i in 0..endpoint_count {
        ring.add(Arc::new(BasicEndpoint::new(format!("10.0.{}.{}:8080", i / 256, i % 256))));
    }
    ring
}

fn bench_get_unbounded(c: &mut Criterion) {
    let ring = build_ring(100, 0.0);
    c.bench_function("get_unbounded_100_endpoints", |b| {
        b.iter(|| ring.get("some-affinity-key"));
    });
}

fn bench_get_bounded(c: &mut Criterion) {
    let ring = build_ring(100, 1.25);
    c.bench_function("get_bounded_100_endpoints", |b| {
        b.iter(|| {
            if let Some(e) = ring.get("some-affinity-key") {
                ring.put(e.as_ref());
            }
        });
    });
}

fn bench_add_endpoint(c: &mut Criterion) {
    c.bench_function("add_single_endpoint_256_replicas", |b| {
        let ring = build_ring(500, 0.0);
        let mut i = 0usize;
        b.iter(|| {
            i += 1;
            ring.add(Arc::new(BasicEndpoint::new(format!("bench-{}", i))));
        });
    });
}

criterion_group!(benches, bench_get_unbounded, bench_get_bounded, bench_add_endpoint);
criterion_main!(benches);
