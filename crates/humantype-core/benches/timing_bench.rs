//! Criterion benchmarks for the delay pipeline.
//!
//! The engine computes one delay per character right before waiting on it,
//! so the pipeline must stay far below the smallest delay it can produce.
//!
//! Run with:
//! ```bash
//! cargo bench --package humantype-core --bench timing_bench
//! ```

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use humantype_core::{KeyboardLayout, TimingConfig, TimingModel};

const PARAGRAPH: &str = "The quick brown fox jumps over the lazy dog. \
Pack my box with five dozen liquor jugs!\nHow vexingly quick daft zebras jump; \
sphinx of black quartz, judge my vow: 1234567890.";

/// Every optional stage switched on.
fn full_config() -> TimingConfig {
    TimingConfig {
        double_letter_enabled: true,
        session_curve_enabled: true,
        burst_enabled: true,
        ..TimingConfig::default()
    }
}

// ── Benchmarks: calculate_delay ───────────────────────────────────────────────

fn bench_calculate_delay(c: &mut Criterion) {
    let layout = Arc::new(KeyboardLayout::us_qwerty());
    let mut group = c.benchmark_group("calculate_delay");

    for (name, config) in [("default", TimingConfig::default()), ("all_stages", full_config())] {
        let mut model = TimingModel::with_seed(config, Arc::clone(&layout), 42)
            .expect("benchmark config must be valid");
        group.bench_function(name, |b| {
            b.iter(|| model.calculate_delay(black_box('K'), black_box(Some(',')), 10, 100))
        });
    }

    group.finish();
}

// ── Benchmarks: calculate_all ─────────────────────────────────────────────────

fn bench_calculate_all(c: &mut Criterion) {
    let layout = Arc::new(KeyboardLayout::us_qwerty());
    let mut group = c.benchmark_group("calculate_all");

    for repeat in [1usize, 10, 100] {
        let text = PARAGRAPH.repeat(repeat);
        group.throughput(Throughput::Elements(text.chars().count() as u64));
        let mut model = TimingModel::with_seed(full_config(), Arc::clone(&layout), 42)
            .expect("benchmark config must be valid");
        group.bench_with_input(BenchmarkId::from_parameter(repeat), &text, |b, text| {
            b.iter(|| model.calculate_all(black_box(text)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_calculate_delay, bench_calculate_all);
criterion_main!(benches);
