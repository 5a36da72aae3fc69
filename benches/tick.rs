use criterion::{criterion_group, criterion_main, Criterion};
use fleetdeck::prelude::*;
use std::time::Duration;

fn bench_ticks(c: &mut Criterion) {
    c.bench_function("hundred_ticks", |b| {
        b.iter(|| {
            let mut center = CommandCenter::new(SimConfig::default().with_seed(1)).unwrap();
            center.boot();
            center.advance(Duration::from_millis(2500 + 1500 * 100));
            center.snapshot().ticks
        })
    });

    c.bench_function("status_command", |b| {
        let mut center = CommandCenter::new(SimConfig::default().with_seed(2)).unwrap();
        center.boot();
        b.iter(|| {
            center.submit("status");
            center.advance(Duration::from_millis(600))
        })
    });
}

criterion_group!(benches, bench_ticks);
criterion_main!(benches);
