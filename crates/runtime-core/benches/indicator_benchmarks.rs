use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use runtime_core::domain_service::IndicatorService;
use runtime_core::entities::TargetInstrument;
use runtime_core::value_objects::Bar;

fn build_instrument(bar_count: usize) -> TargetInstrument {
    let mut instrument = TargetInstrument::new("rb2501.SHFE");
    let mut price = 3500.0_f64;
    for i in 0..bar_count {
        price += (i as f64 * 0.01).sin() * 2.0;
        instrument.append_bar(Bar::new(Utc::now(), price, price + 1.0, price - 1.0, price + 0.5, 1000));
    }
    instrument
}

fn bench_calculate_all(c: &mut Criterion) {
    let service = IndicatorService::default();
    let mut group = c.benchmark_group("indicator_service_calculate_all");
    for bar_count in [30, 200, 1000] {
        let instrument = build_instrument(bar_count);
        group.bench_with_input(BenchmarkId::from_parameter(bar_count), &instrument, |b, instrument| {
            b.iter(|| black_box(service.calculate_all(instrument, None, None)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_calculate_all);
criterion_main!(benches);
