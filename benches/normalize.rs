use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polars::prelude::*;
use renewables_extractor::{normalize, RawRecordTable};

const ROWS: i64 = 24 * 7;
const JUNE_10_MS: i64 = 1_717_977_600_000;

fn raw_week() -> DataFrame {
    let timestamps: Vec<i64> = (0..ROWS).map(|hour| JUNE_10_MS + hour * 3_600_000).collect();
    let iso: Vec<String> = (0..ROWS)
        .map(|hour| format!("2024-06-{:02} {:02}:00:00+00:00", 10 + hour / 24, hour % 24))
        .collect();
    let variables: Vec<i64> = vec![991; ROWS as usize];
    let values: Vec<f64> = (0..ROWS).map(|hour| hour as f64 * 0.5).collect();

    df!(
        "Naive_Timestamp " => timestamps,
        " Variable" => variables,
        "value" => values,
        "Last Modified utc" => iso
    )
    .unwrap()
}

fn bench_normalize(c: &mut Criterion) {
    let frame = raw_week();
    c.bench_function("normalize_week", |b| {
        b.iter(|| normalize(black_box(RawRecordTable::new(frame.clone()))))
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
