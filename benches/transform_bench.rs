use criterion::{Criterion, criterion_group, criterion_main};
use scenario_chart::core::{Dataset, DisplayProjection, SeriesValue};
use scenario_chart::expression::{RuleExpression, RuleFailurePolicy, band_filter};
use scenario_chart::transform::{moving_average, polynomial_trend};
use std::hint::black_box;

fn wave(len: usize) -> Vec<SeriesValue> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            if i % 97 == 0 {
                None
            } else {
                Some(100.0 + (t * 0.05).sin() * 10.0 + t * 0.01)
            }
        })
        .collect()
}

fn bench_moving_average_10k(c: &mut Criterion) {
    let values = wave(10_000);
    c.bench_function("moving_average_10k_window_12", |b| {
        b.iter(|| moving_average(black_box(&values), 12))
    });
}

fn bench_polynomial_trend_2k(c: &mut Criterion) {
    let values = wave(2_000);
    c.bench_function("polynomial_trend_2k_order_6", |b| {
        b.iter(|| polynomial_trend(black_box(&values), 6))
    });
}

fn bench_projection_10k(c: &mut Criterion) {
    let values = wave(10_000);
    c.bench_function("projection_10k", |b| {
        b.iter(|| {
            let projection = DisplayProjection::from_values(black_box(&values));
            projection.project_sequence(&values)
        })
    });
}

fn bench_rule_expression_1k(c: &mut Criterion) {
    let times = (0..1_000).map(|i| format!("{}", 1000 + i)).collect();
    let dataset = Dataset::new(
        "yearly",
        times,
        vec![
            ("GDP".to_owned(), wave(1_000)),
            ("POP".to_owned(), wave(1_000)),
        ],
    )
    .expect("valid dataset");
    let snapshot = dataset.snapshot();
    let rule = RuleExpression::parse("{GDP}[i - 1] / {*POP} + filter({GDP}, 0, 0.1)[i]")
        .expect("valid rule");

    c.bench_function("rule_expression_1k", |b| {
        b.iter(|| rule.evaluate(black_box(&snapshot), "GDP", RuleFailurePolicy::Absent))
    });
}

fn bench_rule_broadcast_32k(c: &mut Criterion) {
    let times = (0..32_000).map(|i| format!("t{i}")).collect();
    let dataset = Dataset::new(
        "daily",
        times,
        vec![("A".to_owned(), wave(32_000)), ("B".to_owned(), wave(32_000))],
    )
    .expect("valid dataset");
    let snapshot = dataset.snapshot();
    let rule = RuleExpression::parse("{A} + {*B}").expect("valid rule");

    c.bench_function("rule_broadcast_32k", |b| {
        b.iter(|| rule.evaluate(black_box(&snapshot), "A", RuleFailurePolicy::Absent))
    });
}

fn bench_band_filter_512(c: &mut Criterion) {
    let values = wave(512);
    c.bench_function("band_filter_512", |b| {
        b.iter(|| band_filter(black_box(&values), 0.0, 0.2).expect("valid cutoffs"))
    });
}

criterion_group!(
    benches,
    bench_moving_average_10k,
    bench_polynomial_trend_2k,
    bench_projection_10k,
    bench_rule_expression_1k,
    bench_rule_broadcast_32k,
    bench_band_filter_512
);
criterion_main!(benches);
