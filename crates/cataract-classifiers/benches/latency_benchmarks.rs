//! Latency benchmarks for the inference path
//!
//! Covers artifact loading, record encoding and end-to-end prediction
//! against the reference model in `models/`.
//!
//! Run with: cargo bench -p cataract-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::{Path, PathBuf};

use cataract_classifiers::{load, predict, ModelCache};
use cataract_core::{PatientRecord, Sex, SlitlampResult, YesNo};

fn reference_artifact() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models/cataract_model.json")
}

fn records() -> Vec<(&'static str, PatientRecord)> {
    let example = PatientRecord {
        family_history: YesNo::No,
        color_change: YesNo::No,
        double_vision: YesNo::No,
        ..PatientRecord::default()
    };
    vec![
        ("example", example.clone()),
        (
            "healthy",
            PatientRecord {
                age: 40,
                sex: Sex::Female,
                lens_opacity: 1.0,
                acuity_decline: 1,
                light_sensitivity: 2,
                intraocular_pressure: 15.0,
                visual_acuity: 1.0,
                ..example.clone()
            },
        ),
        (
            "severe",
            PatientRecord {
                age: 75,
                lens_opacity: 9.0,
                slitlamp_result: SlitlampResult::Abnormal,
                visual_acuity: 0.2,
                ..example
            },
        ),
    ]
}

/// Benchmark reading and validating the artifact
fn benchmark_load(c: &mut Criterion) {
    let path = reference_artifact();

    c.bench_function("load_artifact", |b| {
        b.iter(|| load(black_box(&path)).is_available());
    });
}

/// Benchmark encoding alone
fn benchmark_encode(c: &mut Criterion) {
    let model = load(reference_artifact())
        .into_result()
        .expect("reference artifact should load");
    let pipeline = model.pipeline();

    let mut group = c.benchmark_group("encode");
    for (name, record) in records() {
        group.bench_with_input(BenchmarkId::new("record", name), &record, |b, record| {
            b.iter(|| pipeline.encode(black_box(record)).unwrap());
        });
    }
    group.finish();
}

/// Benchmark a full prediction through the cache
fn benchmark_predict(c: &mut Criterion) {
    let cache = ModelCache::new(reference_artifact());
    let model = cache
        .get_or_load()
        .into_result()
        .expect("reference artifact should load");

    let mut group = c.benchmark_group("predict");
    group.sample_size(200);
    for (name, record) in records() {
        group.bench_with_input(BenchmarkId::new("record", name), &record, |b, record| {
            b.iter(|| predict(black_box(record), &model).unwrap());
        });
    }
    group.finish();

    c.bench_function("cached_lookup", |b| {
        b.iter(|| cache.get_or_load().is_available());
    });
}

criterion_group!(benches, benchmark_load, benchmark_encode, benchmark_predict);
criterion_main!(benches);
