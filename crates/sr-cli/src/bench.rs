use std::cmp::Ordering;
use std::time::Instant;

use log::LevelFilter;
use sr_core::offline::{synthetic_page, OfflineHost};
use sr_core::{FilterController, ScanReport};

const BENCH_URL: &str = "https://www.youtube.com/";

pub struct BenchOptions {
    pub cards: usize,
    pub iterations: usize,
}

struct BenchResult {
    iterations: usize,
    total_ms: f64,
    avg_us: f64,
    p50_us: f64,
    p95_us: f64,
    p99_us: f64,
}

pub fn run(opts: BenchOptions) -> Result<(), String> {
    if opts.iterations == 0 {
        return Err("Iterations must be at least 1".to_string());
    }

    // Every scan logs its diagnostic line; keep the output readable.
    log::set_max_level(LevelFilter::Warn);

    println!("============================================================");
    println!("ShortsRemover Benchmark");
    println!("============================================================");
    println!("Cards: {}", opts.cards);
    println!("Iterations: {}", opts.iterations);

    let page = synthetic_page(opts.cards);
    println!("Page size: {:.1} KB", page.len() as f64 / 1024.0);

    let mut parse_us = Vec::with_capacity(opts.iterations);
    let mut first_us = Vec::with_capacity(opts.iterations);
    let mut settled_us = Vec::with_capacity(opts.iterations);
    let mut first_report = None;

    for _ in 0..opts.iterations {
        let start = Instant::now();
        let host = OfflineHost::new(&page, BENCH_URL);
        parse_us.push(elapsed_us(start));

        let mut controller = FilterController::with_defaults(host);

        let start = Instant::now();
        let report = controller.scan();
        first_us.push(elapsed_us(start));

        let start = Instant::now();
        controller.scan();
        settled_us.push(elapsed_us(start));

        first_report.get_or_insert(report);
    }

    if let Some(ScanReport::Filtered {
        matched,
        detached,
        counted,
        ..
    }) = first_report
    {
        println!("First scan: matched {}, detached {}, counted {}", matched, detached, counted);
    }

    println!("------------------------------------------------------------");
    println!("{}", format_result("Parse page", &summarize(parse_us)));
    println!("------------------------------------------------------------");
    println!("{}", format_result("First scan", &summarize(first_us)));
    println!("------------------------------------------------------------");
    println!("{}", format_result("Settled rescan", &summarize(settled_us)));

    Ok(())
}

fn elapsed_us(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000_000.0
}

fn summarize(mut samples: Vec<f64>) -> BenchResult {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let total_us = samples.iter().sum::<f64>();

    BenchResult {
        iterations: samples.len(),
        total_ms: total_us / 1000.0,
        avg_us: if samples.is_empty() { 0.0 } else { total_us / samples.len() as f64 },
        p50_us: percentile(&samples, 0.50),
        p95_us: percentile(&samples, 0.95),
        p99_us: percentile(&samples, 0.99),
    }
}

fn format_result(name: &str, result: &BenchResult) -> String {
    format!(
        "{}:\n  Iterations: {}\n  Total time: {:.2}ms\n  Avg latency: {:.2}μs\n  P50 latency: {:.2}μs\n  P95 latency: {:.2}μs\n  P99 latency: {:.2}μs",
        name, result.iterations, result.total_ms, result.avg_us, result.p50_us, result.p95_us, result.p99_us,
    )
}

fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let idx = ((values.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}
