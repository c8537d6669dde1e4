use airiq::{
    aqi::{aqi_from_pm2_5, evaluate},
    config::AlertThresholds,
    sampling::reading::Reading,
    storage::CsvStore,
};
use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn sample_reading() -> Reading {
    let mut reading = Reading::new(Utc::now());
    reading.pm1_0 = Some(8.0);
    reading.pm2_5 = Some(15.2);
    reading.pm10 = Some(22.1);
    reading.co2 = Some(450.0);
    reading.eco2 = Some(420.0);
    reading.tvoc = Some(45.0);
    reading.ozone = Some(25.0);
    reading.temperature = Some(22.5);
    reading.humidity = Some(55.0);
    reading
}

/// Benchmark AQI derivation across the breakpoint table
fn bench_aqi_lookup(c: &mut Criterion) {
    for concentration in [5.0, 40.0, 120.0, 400.0] {
        c.bench_with_input(
            BenchmarkId::new("aqi_from_pm2_5", concentration as u32),
            &concentration,
            |b, &concentration| b.iter(|| aqi_from_pm2_5(concentration)),
        );
    }
}

/// Benchmark the full per-cycle evaluation
fn bench_evaluation(c: &mut Criterion) {
    let reading = sample_reading();
    let thresholds = AlertThresholds::default();

    c.bench_function("cycle_evaluation", |b| {
        b.iter(|| evaluate(&reading, &thresholds))
    });
}

/// Benchmark JSON serialization of readings (the WebSocket hot path)
fn bench_json_serialization(c: &mut Criterion) {
    let reading = sample_reading();

    c.bench_function("reading_json_serialization", |b| {
        b.iter(|| serde_json::to_string(&reading).expect("Should serialize"))
    });
}

/// Benchmark CSV row rendering
fn bench_csv_record(c: &mut Criterion) {
    let reading = sample_reading();

    c.bench_function("csv_record_rendering", |b| b.iter(|| reading.csv_record()));
}

/// Benchmark appending to and querying the data log
fn bench_store_roundtrip(c: &mut Criterion) {
    let path = std::env::temp_dir().join(format!("airiq-bench-{}.csv", uuid::Uuid::new_v4()));
    let store = CsvStore::new(&path);
    let reading = sample_reading();

    c.bench_function("store_append", |b| {
        b.iter(|| store.append(&reading).expect("Should append"))
    });

    c.bench_function("store_series_query", |b| {
        b.iter(|| store.series("pm2_5", 24).expect("Should query"))
    });

    std::fs::remove_file(&path).ok();
}

criterion_group!(
    benches,
    bench_aqi_lookup,
    bench_evaluation,
    bench_json_serialization,
    bench_csv_record,
    bench_store_roundtrip
);

criterion_main!(benches);
