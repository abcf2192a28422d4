use proptest::prelude::*;
use scenario_chart::core::{Dataset, SeriesValue};

fn build(values: Vec<SeriesValue>) -> Dataset {
    let times = (0..values.len()).map(|i| format!("{}", 1990 + i)).collect();
    let other = values.iter().rev().copied().collect();
    Dataset::new(
        "yearly",
        times,
        vec![("A".to_owned(), values), ("B".to_owned(), other)],
    )
    .expect("valid dataset")
}

fn series_strategy() -> impl Strategy<Value = Vec<SeriesValue>> {
    prop::collection::vec(prop::option::of(-1_000_000.0f64..1_000_000.0), 1..24)
}

proptest! {
    #[test]
    fn every_series_matches_extended_span(values in series_strategy(), delta in 0i64..40) {
        let mut dataset = build(values);
        let original_len = dataset.original_len();
        dataset.extend(delta).expect("extend");

        let expected = original_len + delta as usize;
        prop_assert_eq!(dataset.len(), expected);
        prop_assert_eq!(dataset.times().len(), expected);
        for series in dataset.series() {
            prop_assert_eq!(series.len(), expected);
        }
    }

    #[test]
    fn extend_then_zero_restores_original(values in series_strategy(), delta in -10i64..40) {
        let mut dataset = build(values.clone());
        let times = dataset.times().to_vec();

        dataset.extend(delta).expect("extend");
        dataset.extend(0).expect("restore");

        prop_assert_eq!(dataset.times(), times.as_slice());
        prop_assert_eq!(
            dataset.series_by_label("A").expect("A").values(),
            values.as_slice()
        );
    }

    #[test]
    fn incremental_growth_matches_direct_growth(
        values in series_strategy(),
        first in 0i64..20,
        second in 0i64..20
    ) {
        let mut stepwise = build(values.clone());
        stepwise.extend(first).expect("first");
        stepwise.extend(first + second).expect("second");

        let mut direct = build(values);
        direct.extend(first + second).expect("direct");

        prop_assert_eq!(stepwise.times(), direct.times());
        for (left, right) in stepwise.series().zip(direct.series()) {
            prop_assert_eq!(left.values(), right.values());
        }
    }
}
