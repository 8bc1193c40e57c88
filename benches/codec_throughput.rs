//! Benchmark suite for encode and decode throughput
//!
//! Measures:
//! - Encoding and decoding of a record mixing unions, logical types and
//!   nested collections
//! - Union resolution cost as the matching branch moves further right
//!
//! # Configuration
//!
//! - `BENCH_SAMPLE_SIZE`: Number of samples to collect (default: 100)
//! - `BENCH_MEASUREMENT_TIME`: Measurement time in seconds (default: 5)
//! - `BENCH_WARM_UP_TIME`: Warm-up time in seconds (default: 3)
//! - `BENCH_RECORDS`: Records encoded per iteration (default: 1000)
//!
//! ```bash
//! BENCH_SAMPLE_SIZE=50 BENCH_RECORDS=10000 cargo bench
//! ```

use std::hint::black_box;
use std::str::FromStr;
use std::time::Duration;

use bigdecimal::BigDecimal;
use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use uuid::Uuid;

use glider::{read, to_vec, write, Schema, Value};

const EVENT_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Event",
    "namespace": "bench",
    "fields": [
        {"name": "id", "type": {"type": "string", "logicalType": "uuid"}},
        {"name": "at", "type": {"type": "long", "logicalType": "timestamp-micros"}},
        {"name": "source", "type": ["null", "string"]},
        {"name": "amount", "type": {
            "type": "bytes", "logicalType": "decimal", "precision": 18, "scale": 6
        }},
        {"name": "tags", "type": {"type": "array", "items": "string"}},
        {"name": "metrics", "type": {"type": "map", "values": ["float", "long", "double"]}}
    ]
}"#;

/// Parse an environment variable, reporting values that do not parse.
fn env_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => {
            eprintln!("Configured {}: {}", name, raw);
            Some(value)
        }
        Err(_) => {
            eprintln!("Warning: Invalid {} value: {}", name, raw);
            None
        }
    }
}

/// Configure Criterion based on environment variables
fn configure_criterion() -> Criterion {
    let mut criterion = Criterion::default();
    if let Some(size) = env_var::<usize>("BENCH_SAMPLE_SIZE") {
        criterion = criterion.sample_size(size);
    }
    if let Some(secs) = env_var::<u64>("BENCH_MEASUREMENT_TIME") {
        criterion = criterion.measurement_time(Duration::from_secs(secs));
    }
    if let Some(secs) = env_var::<u64>("BENCH_WARM_UP_TIME") {
        criterion = criterion.warm_up_time(Duration::from_secs(secs));
    }
    criterion
}

fn event(i: i64) -> Value {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(i);
    Value::record([
        ("id", Value::Uuid(Uuid::from_u128(i as u128))),
        ("at", Value::Timestamp(at)),
        ("source", if i % 3 == 0 { Value::Null } else { Value::from("sensor") }),
        (
            "amount",
            Value::Decimal(BigDecimal::from_str(&format!("{}.125", i)).unwrap()),
        ),
        ("tags", Value::array(["alpha", "beta"])),
        (
            "metrics",
            Value::map([
                ("count", Value::Long(i)),
                ("ratio", Value::Double(i as f64 / 7.0)),
            ]),
        ),
    ])
}

/// Benchmark encoding and decoding a batch of records
fn bench_records(c: &mut Criterion) {
    let schema: Schema = EVENT_SCHEMA.parse().unwrap();
    let count = env_var::<i64>("BENCH_RECORDS").unwrap_or(1000);
    let events: Vec<Value> = (0..count).map(event).collect();

    let mut encoded = Vec::new();
    for e in &events {
        write(&mut encoded, &schema, e).unwrap();
    }

    let mut group = c.benchmark_group("records");
    group.throughput(Throughput::Bytes(encoded.len() as u64));

    group.bench_function("encode", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(encoded.len());
            for e in &events {
                write(&mut out, &schema, e).unwrap();
            }
            black_box(out)
        })
    });

    group.bench_function("decode", |b| {
        b.iter(|| {
            let mut cursor = encoded.as_slice();
            for _ in 0..count {
                black_box(read(&mut cursor, &schema).unwrap());
            }
        })
    });

    group.finish();
}

/// Benchmark union resolution by position of the matching branch
fn bench_union_resolution(c: &mut Criterion) {
    let schema: Schema = r#"["null", "boolean", "bytes", "float", "string"]"#
        .parse()
        .unwrap();

    let mut group = c.benchmark_group("union_resolution");
    for (label, value) in [
        ("first", Value::Null),
        ("numeric", Value::Long(42)),
        ("last", Value::from("text")),
    ] {
        group.bench_with_input(BenchmarkId::new("encode", label), &value, |b, value| {
            b.iter(|| black_box(to_vec(&schema, value).unwrap()))
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_records, bench_union_resolution
}

criterion_main!(benches);
