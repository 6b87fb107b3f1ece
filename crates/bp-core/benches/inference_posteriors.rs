//! Criterion benchmarks for the posterior recurrences in `bp-core`.
//!
//! Tables and tracks are synthetic so the numbers are stable across machines.

use bp_common::Channel;
use bp_core::evidence::{speed_tokens, variation_tokens, EvidenceSequence, Reading};
use bp_core::inference::{EvidenceLedger, SequentialUpdater};
use bp_core::likelihood::{ChannelTables, LikelihoodModel, LikelihoodTable};
use bp_config::VariationTracking;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn smooth_table(width: usize, peak: usize) -> LikelihoodTable {
    let raw: Vec<f64> = (0..width)
        .map(|i| {
            let d = i as f64 - peak as f64;
            (-d * d / 200.0).exp() + 1e-3
        })
        .collect();
    let total: f64 = raw.iter().sum();
    LikelihoodTable::new(raw.into_iter().map(|v| v / total).collect()).expect("normalized")
}

fn model() -> LikelihoodModel {
    LikelihoodModel {
        speed: ChannelTables::new(Channel::Speed, smooth_table(400, 40), smooth_table(400, 300))
            .expect("same width"),
        variation: ChannelTables::new(
            Channel::Variation,
            smooth_table(100, 8),
            smooth_table(100, 2),
        )
        .expect("same width"),
    }
}

/// A track with a missing reading every 17 steps.
fn track(len: usize, base: f64) -> Vec<Reading> {
    (0..len)
        .map(|i| {
            if i % 17 == 5 {
                Reading::Missing
            } else {
                Reading::Value(base + ((i * 7) % 11) as f64 * 0.9)
            }
        })
        .collect()
}

fn bench_recurrences(c: &mut Criterion) {
    let model = model();
    let updater = SequentialUpdater::new(&model, 0.5);

    let mut group = c.benchmark_group("posterior");
    for len in [100usize, 1_000, 10_000] {
        let readings = track(len, 60.0);
        let speed = speed_tokens(&readings, 2.0);
        let variation = variation_tokens(&readings, VariationTracking::Strict);
        let seq = EvidenceSequence::aligned(speed.clone(), variation).expect("aligned");

        group.bench_with_input(BenchmarkId::new("bird_only", len), &speed, |b, speed| {
            b.iter(|| black_box(updater.bird_posterior(black_box(speed)).posterior))
        });
        group.bench_with_input(BenchmarkId::new("fused", len), &seq, |b, seq| {
            b.iter(|| black_box(updater.plane_posterior(black_box(seq)).posterior))
        });
        group.bench_with_input(BenchmarkId::new("fused_with_ledger", len), &seq, |b, seq| {
            b.iter(|| {
                let trace = updater.plane_posterior(black_box(seq));
                black_box(EvidenceLedger::from_trace(&trace).total_log_bf)
            })
        });
    }
    group.finish();
}

fn bench_preprocess(c: &mut Criterion) {
    let readings = track(10_000, 60.0);
    let mut group = c.benchmark_group("preprocess");
    group.bench_function("speed_tokens_10k", |b| {
        b.iter(|| black_box(speed_tokens(black_box(&readings), 2.0)))
    });
    for tracking in [VariationTracking::Strict, VariationTracking::Legacy] {
        group.bench_function(format!("variation_tokens_10k_{}", tracking), |b| {
            b.iter(|| black_box(variation_tokens(black_box(&readings), tracking)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_recurrences, bench_preprocess);
criterion_main!(benches);
