use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use lrsc_probe::prelude::*;

fn bench_classify(c: &mut Criterion) {
    let t = Thresholds::default();
    c.bench_function("classify_sweep", |b| {
        b.iter(|| {
            let mut cache_line = 0u32;
            for f in (0..10_000_000u64).step_by(10_007) {
                if t.classify(failure_ratio(black_box(f), 10_000_000)) == Verdict::CacheLine {
                    cache_line += 1;
                }
            }
            cache_line
        });
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
