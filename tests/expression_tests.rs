use approx::assert_abs_diff_eq;
use scenario_chart::ChartError;
use scenario_chart::core::Dataset;
use scenario_chart::expression::{
    RuleExpression, RuleFailurePolicy, SeriesRef, band_filter, evaluate_rule_text,
};
use scenario_chart::transform::{TransformOptions, TransformSpec, compute_derived};

fn two_step_dataset() -> Dataset {
    Dataset::new(
        "yearly",
        vec!["2020".to_owned(), "2021".to_owned()],
        vec![
            ("A".to_owned(), vec![Some(10.0), Some(20.0)]),
            ("B".to_owned(), vec![Some(1.0), Some(2.0)]),
        ],
    )
    .expect("valid dataset")
}

fn eval(text: &str, policy: RuleFailurePolicy) -> scenario_chart::expression::RuleEvaluation {
    let data = two_step_dataset();
    evaluate_rule_text(text, &data.snapshot(), "A", policy)
}

#[test]
fn whole_series_plus_step_value_resolves_per_timestep() {
    let evaluation = eval("{A}+{*B}", RuleFailurePolicy::Absent);
    assert_eq!(evaluation.values, vec![Some(11.0), Some(22.0)]);
    assert!(evaluation.warnings.is_empty());
}

#[test]
fn selected_source_placeholders_follow_the_chart_source() {
    assert_eq!(
        eval("{!*} * 2", RuleFailurePolicy::Absent).values,
        vec![Some(20.0), Some(40.0)]
    );
    assert_eq!(
        eval("{!} - {*B}", RuleFailurePolicy::Absent).values,
        vec![Some(9.0), Some(18.0)]
    );
}

#[test]
fn loop_index_and_subscripts() {
    assert_eq!(
        eval("i", RuleFailurePolicy::Absent).values,
        vec![Some(0.0), Some(1.0)]
    );
    // Out-of-range lookups are undefined, not failures.
    let lagged = eval("{A}[i - 1]", RuleFailurePolicy::Absent);
    assert_eq!(lagged.values, vec![None, Some(10.0)]);
    assert!(lagged.warnings.is_empty());
}

#[test]
fn comparisons_and_power() {
    assert_eq!(
        eval("{*A} > 15", RuleFailurePolicy::Absent).values,
        vec![Some(0.0), Some(1.0)]
    );
    assert_eq!(
        eval("{*B} ^ 2 + -1", RuleFailurePolicy::Absent).values,
        vec![Some(0.0), Some(3.0)]
    );
}

#[test]
fn division_by_zero_is_undefined_without_warning() {
    let absent = eval("{*A} / ({*B} - 1)", RuleFailurePolicy::Absent);
    assert_eq!(absent.values, vec![None, Some(20.0)]);
    assert!(absent.warnings.is_empty());

    let zero = eval("{*A} / ({*B} - 1)", RuleFailurePolicy::Zero);
    assert_eq!(zero.values, vec![Some(0.0), Some(20.0)]);
}

#[test]
fn parse_failure_degrades_whole_sequence_with_one_warning() {
    let absent = eval("{A", RuleFailurePolicy::Absent);
    assert_eq!(absent.values, vec![None, None]);
    assert_eq!(absent.warnings.len(), 1);
    assert_eq!(absent.warnings[0].timestep, None);

    let legacy = eval("{A", RuleFailurePolicy::Zero);
    assert_eq!(legacy.values, vec![Some(0.0), Some(0.0)]);
}

#[test]
fn oversized_rules_degrade_instead_of_overflowing() {
    let negations = format!("{}1", "-".repeat(20_000));
    let long_sum = vec!["1"; 100_000].join("+");
    let deep_sum = vec!["{*A}"; 1_000].join("+");
    for text in [&negations, &long_sum, &deep_sum] {
        let evaluation = eval(text, RuleFailurePolicy::Absent);
        assert_eq!(evaluation.values, vec![None, None]);
        assert_eq!(evaluation.warnings.len(), 1);
        assert_eq!(evaluation.warnings[0].timestep, None);
    }
}

#[test]
fn repeated_negation_within_limits_evaluates() {
    let odd = format!("{}{{*B}}", "-".repeat(1_001));
    assert_eq!(
        eval(&odd, RuleFailurePolicy::Absent).values,
        vec![Some(-1.0), Some(-2.0)]
    );
    let even = format!("{}{{*B}}", "-".repeat(1_000));
    assert_eq!(
        eval(&even, RuleFailurePolicy::Absent).values,
        vec![Some(1.0), Some(2.0)]
    );
}

#[test]
fn overflowing_literal_is_rejected() {
    let evaluation = eval("1e999", RuleFailurePolicy::Absent);
    assert_eq!(evaluation.values, vec![None, None]);
    assert_eq!(evaluation.warnings.len(), 1);
    assert_eq!(evaluation.warnings[0].timestep, None);

    let err = RuleExpression::parse("{*A} * 1e400").expect_err("out of range literal");
    assert!(matches!(err, ChartError::InvalidExpression(_)));
    assert!(RuleExpression::parse("1e300").is_ok());
}

#[test]
fn unknown_series_reference_degrades_with_warning() {
    let evaluation = eval("{Missing} + 1", RuleFailurePolicy::Absent);
    assert_eq!(evaluation.values, vec![None, None]);
    assert_eq!(evaluation.warnings.len(), 1);
    assert!(evaluation.warnings[0].message.contains("Missing"));
}

#[test]
fn per_timestep_failures_are_reported_individually() {
    let evaluation = eval("{A}[0.5 * ({*B} - 1)]", RuleFailurePolicy::Absent);
    // Index 0 is valid at the first step; index 0.5 fails at the second.
    assert_eq!(evaluation.values, vec![Some(10.0), None]);
    assert_eq!(evaluation.warnings.len(), 1);
    assert_eq!(evaluation.warnings[0].timestep, Some(1));
}

#[test]
fn whole_series_arithmetic_matches_per_step_form_on_long_spans() {
    let len = 50_000;
    let data = Dataset::new(
        "daily",
        (0..len).map(|day| format!("day-{day}")).collect(),
        vec![
            (
                "A".to_owned(),
                (0..len).map(|step| Some(step as f64)).collect(),
            ),
            (
                "B".to_owned(),
                (0..len).map(|step| (step % 7 != 0).then_some(0.5)).collect(),
            ),
        ],
    )
    .expect("valid dataset");
    let snapshot = data.snapshot();

    let run = |text: &str| evaluate_rule_text(text, &snapshot, "A", RuleFailurePolicy::Absent);

    let broadcast = run("-({A} + {*B}) * 2");
    let per_step = run("-({*A} + {*B}) * 2");
    assert!(broadcast.warnings.is_empty());
    assert_eq!(broadcast.values, per_step.values);
    assert_eq!(broadcast.values[1], Some(-3.0));
    assert_eq!(broadcast.values[7], None);

    let lagged = run("({A} * 2)[i - 1]");
    assert_eq!(lagged.values[0], None);
    assert_eq!(lagged.values[len - 1], Some(2.0 * (len - 2) as f64));
}

#[test]
fn step_dependent_filter_is_recomputed_each_timestep() {
    let evaluation = eval("filter({A}, 0, i)[0]", RuleFailurePolicy::Absent);
    // i = 0 keeps only the mean; i = 1 passes the series through.
    assert_abs_diff_eq!(evaluation.values[0].expect("defined"), 15.0, epsilon = 1e-9);
    assert_abs_diff_eq!(evaluation.values[1].expect("defined"), 10.0, epsilon = 1e-9);
}

#[test]
fn full_band_filter_reproduces_series() {
    let evaluation = eval("filter({A}, 0, 1)[i]", RuleFailurePolicy::Absent);
    assert_abs_diff_eq!(evaluation.values[0].expect("defined"), 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(evaluation.values[1].expect("defined"), 20.0, epsilon = 1e-9);
}

#[test]
fn zero_band_filter_keeps_only_the_mean() {
    let evaluation = eval("filter({A}, 0, 0)", RuleFailurePolicy::Absent);
    for value in evaluation.values {
        assert_abs_diff_eq!(value.expect("defined"), 15.0, epsilon = 1e-9);
    }
}

#[test]
fn filter_keeps_gaps_absent() {
    let filtered =
        band_filter(&[Some(1.0), None, Some(3.0), Some(4.0)], 0.0, 1.0).expect("filter");
    assert_eq!(filtered[1], None);
    assert_abs_diff_eq!(filtered[0].expect("defined"), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(filtered[3].expect("defined"), 4.0, epsilon = 1e-9);
}

#[test]
fn invalid_filter_cutoffs_warn_per_timestep() {
    let evaluation = eval("filter({A}, 0.5, 0.2)[i]", RuleFailurePolicy::Absent);
    assert_eq!(evaluation.values, vec![None, None]);
    assert_eq!(evaluation.warnings.len(), 2);

    let err = band_filter(&[Some(1.0)], -0.1, 0.5).expect_err("negative cutoff");
    assert!(matches!(err, ChartError::InvalidExpression(_)));
}

#[test]
fn parsed_rule_exposes_its_references() {
    let rule = RuleExpression::parse("{GDP} / {*POP} + {!*}").expect("parse");
    assert_eq!(rule.source(), "{GDP} / {*POP} + {!*}");
    assert_eq!(
        rule.references(),
        &[
            SeriesRef::Named("GDP".to_owned()),
            SeriesRef::Named("POP".to_owned()),
            SeriesRef::Selected,
        ]
    );
}

#[test]
fn rule_transform_surfaces_warnings_in_derived_sequence() {
    let data = two_step_dataset();
    let derived = compute_derived(
        &TransformSpec::RuleExpression {
            text: "max({A})".to_owned(),
        },
        &data.snapshot(),
        "A",
        TransformOptions::default(),
    )
    .expect("rule transforms never fail structurally");

    assert_eq!(derived.values, vec![None, None]);
    assert_eq!(derived.warnings.len(), 1);
}
