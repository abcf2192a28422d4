use approx::assert_abs_diff_eq;
use scenario_chart::ChartError;
use scenario_chart::core::{
    DisplayProjection, LabelLocale, UNKNOWN_LABEL, Viewport, format_extreme_label,
};

#[test]
fn flat_sequence_collapses_to_zero() {
    let values = [Some(5.0), Some(5.0), None, Some(5.0)];
    let projection = DisplayProjection::from_values(&values);

    assert!(projection.is_degenerate());
    assert_eq!(projection.scale(), 0.0);
    assert_eq!(projection.offset(), 0.0);
    assert_eq!(
        projection.project_sequence(&values),
        vec![Some(0.0), Some(0.0), None, Some(0.0)]
    );
}

#[test]
fn all_absent_sequence_is_degenerate() {
    let projection = DisplayProjection::from_values(&[None, None]);
    assert_eq!(projection, DisplayProjection::default());
    assert!(projection.is_degenerate());
}

#[test]
fn extremes_map_to_unit_range() {
    let projection = DisplayProjection::from_values(&[Some(-5.0), None, Some(0.0), Some(5.0)]);

    assert_abs_diff_eq!(projection.scale(), 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(projection.offset(), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(projection.project(-5.0), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(projection.project(0.0), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(projection.project(5.0), 1.0, epsilon = 1e-12);
}

#[test]
fn pixel_round_trip_uses_viewport_height() {
    let projection = DisplayProjection::from_extremes(100.0, 300.0);
    let viewport = Viewport::new(640, 200);

    let top = projection.value_to_pixel(300.0, viewport).expect("to pixel");
    let bottom = projection.value_to_pixel(100.0, viewport).expect("to pixel");
    assert_abs_diff_eq!(top, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(bottom, 200.0, epsilon = 1e-9);

    let px = projection.value_to_pixel(175.0, viewport).expect("to pixel");
    let recovered = projection.pixel_to_value(px, viewport).expect("from pixel");
    assert_abs_diff_eq!(recovered, 175.0, epsilon = 1e-9);
}

#[test]
fn flat_projection_cannot_be_inverted() {
    let projection = DisplayProjection::from_extremes(3.0, 3.0);
    let err = projection
        .pixel_to_value(10.0, Viewport::new(100, 100))
        .expect_err("degenerate");
    assert!(matches!(err, ChartError::DegenerateRange));
}

#[test]
fn invalid_viewport_is_rejected() {
    let projection = DisplayProjection::from_extremes(0.0, 1.0);
    let err = projection
        .value_to_pixel(0.5, Viewport::new(100, 0))
        .expect_err("zero height");
    assert!(matches!(err, ChartError::InvalidViewport { height: 0, .. }));
}

#[test]
fn labels_switch_to_scientific_above_threshold() {
    let mut projection = DisplayProjection::from_extremes(-1234.5, 2_500_000.0);
    let labels = projection.format_labels(LabelLocale::EnUs);
    assert_eq!(labels.min, "-1,234.5");
    assert_eq!(labels.max, "2.50e6");

    let mut projection = DisplayProjection::from_extremes(-1234.5, 2_500_000.0);
    let labels = projection.format_labels(LabelLocale::EsEs);
    assert_eq!(labels.min, "-1.234,5");
    assert_eq!(labels.max, "2,50e6");
}

#[test]
fn threshold_itself_stays_fixed_point() {
    assert_eq!(
        format_extreme_label(1_000_000.0, LabelLocale::EnUs).expect("format"),
        "1,000,000.0"
    );
}

#[test]
fn unformattable_extremes_fall_back_to_unknown() {
    let mut projection = DisplayProjection::from_extremes(f64::NAN, 1.0);
    let labels = projection.format_labels(LabelLocale::EnUs);

    assert_eq!(labels.min, UNKNOWN_LABEL);
    assert_eq!(labels.max, UNKNOWN_LABEL);
    assert_eq!(projection.min(), 0.0);
    assert_eq!(projection.max(), 0.0);
}
