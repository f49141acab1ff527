use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use runtime_data::{BarRecord, Database};

fn generate_bars(count: usize) -> Vec<BarRecord> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            BarRecord::new(
                "IM2601.CFFEX".to_string(),
                now + Duration::minutes(i as i64),
                6290.0 + (i as f64) * 0.1,
                6295.0 + (i as f64) * 0.1,
                6285.0 + (i as f64) * 0.1,
                6292.0 + (i as f64) * 0.1,
                500,
            )
        })
        .collect()
}

fn bench_insert_bars(c: &mut Criterion) {
    let bars_10k = generate_bars(10_000);

    c.bench_function("insert_10k_bars", |b| {
        b.iter(|| {
            let db = Database::new_memory().unwrap();
            db.insert_bars(black_box(&bars_10k)).unwrap();
        });
    });
}

fn bench_query_bars(c: &mut Criterion) {
    let db = Database::new_memory().unwrap();
    let bars = generate_bars(10_000);
    db.insert_bars(&bars).unwrap();

    let now = Utc::now();

    c.bench_function("query_10k_bars", |b| {
        b.iter(|| {
            let result = db
                .query_bars(
                    black_box("IM2601.CFFEX"),
                    black_box(now),
                    black_box(now + Duration::minutes(10_000)),
                )
                .unwrap();
            black_box(result);
        });
    });
}

fn bench_replay_for_symbols(c: &mut Criterion) {
    let db = Database::new_memory().unwrap();
    let bars = generate_bars(50_000);
    db.insert_bars(&bars).unwrap();

    c.bench_function("replay_50k_bars", |b| {
        b.iter(|| {
            let mut count = 0usize;
            runtime_data::replay_bars_from_database(
                &db,
                black_box(&["IM2601.CFFEX".to_string()]),
                black_box(365),
                |_, _| count += 1,
            )
            .unwrap();
            black_box(count);
        });
    });
}

criterion_group!(benches, bench_insert_bars, bench_query_bars, bench_replay_for_symbols);
criterion_main!(benches);
