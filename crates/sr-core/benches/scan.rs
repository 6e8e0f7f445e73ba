//! Benchmarks: one scan pass over synthetic home feeds

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sr_core::offline::{OfflineHost, synthetic_page};
use sr_core::FilterController;

fn bench_first_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_scan");
    for cards in [100usize, 1_000, 5_000] {
        let page = synthetic_page(cards);
        group.bench_with_input(BenchmarkId::from_parameter(cards), &page, |b, page| {
            b.iter_batched(
                || FilterController::with_defaults(OfflineHost::new(page, "https://www.youtube.com/")),
                |mut ctl| black_box(ctl.scan()),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_settled_rescan(c: &mut Criterion) {
    // Steady state: nothing left to remove, every strategy still queries
    let page = synthetic_page(1_000);
    let mut ctl = FilterController::with_defaults(OfflineHost::new(&page, "https://www.youtube.com/"));
    ctl.scan();

    c.bench_function("settled_rescan_1000", |b| b.iter(|| black_box(ctl.scan())));
}

criterion_group!(benches, bench_first_scan, bench_settled_rescan);
criterion_main!(benches);
