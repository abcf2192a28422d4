//! Transform engine: derives a display sequence from a raw series.
//!
//! Every kernel is a pure function of a [`DatasetSnapshot`]. Structural
//! problems (bad parameters, unknown series) are rejected up front; problems
//! at a single timestep only make that entry absent.

pub mod elasticity;
pub mod lag;
pub mod moving_average;
pub mod polynomial;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{DatasetSnapshot, SeriesValue};
use crate::error::{ChartError, ChartResult};
use crate::expression::{ExpressionWarning, RuleFailurePolicy, evaluate_rule_text};

pub use elasticity::elasticity;
pub use lag::{LagMode, shift};
pub use moving_average::moving_average;
pub use polynomial::{MAX_POLYNOMIAL_ORDER, MIN_POLYNOMIAL_ORDER, PolynomialFit, polynomial_trend};

/// Active transform of a chart together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformSpec {
    #[default]
    Identity,
    MovingAverage { window: usize },
    PolynomialTrend { order: usize },
    /// Elasticity of the source with respect to the `price` series.
    Elasticity { window: usize, price: String },
    RuleExpression { text: String },
    LagShift { offset: i64 },
}

impl TransformSpec {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::MovingAverage { .. } => "moving_average",
            Self::PolynomialTrend { .. } => "polynomial_trend",
            Self::Elasticity { .. } => "elasticity",
            Self::RuleExpression { .. } => "rule_expression",
            Self::LagShift { .. } => "lag_shift",
        }
    }

    /// Rejects malformed parameters instead of clamping them.
    pub fn validate(&self) -> ChartResult<()> {
        match self {
            Self::Identity | Self::LagShift { .. } | Self::RuleExpression { .. } => Ok(()),
            Self::MovingAverage { window } | Self::Elasticity { window, .. } if *window == 0 => {
                Err(ChartError::InvalidTransform(format!(
                    "{} window must be >= 1",
                    self.kind_name()
                )))
            }
            Self::MovingAverage { .. } => Ok(()),
            Self::Elasticity { price, .. } => {
                if price.trim().is_empty() {
                    return Err(ChartError::InvalidTransform(
                        "elasticity requires a price series".to_owned(),
                    ));
                }
                Ok(())
            }
            Self::PolynomialTrend { order } => {
                if !(MIN_POLYNOMIAL_ORDER..=MAX_POLYNOMIAL_ORDER).contains(order) {
                    return Err(ChartError::InvalidTransform(format!(
                        "polynomial order must be between {MIN_POLYNOMIAL_ORDER} and \
                         {MAX_POLYNOMIAL_ORDER}, got {order}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Engine switches that are not part of a transform spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformOptions {
    pub rule_failure_policy: RuleFailurePolicy,
    pub lag_mode: LagMode,
}

/// Output of the transform engine; one entry per timestep of the span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSequence {
    pub values: Vec<SeriesValue>,
    #[serde(default)]
    pub warnings: Vec<ExpressionWarning>,
    /// Lag offset reported for display when the lag is not applied.
    #[serde(default)]
    pub display_lag: Option<i64>,
    pub snapshot_version: u64,
}

impl DerivedSequence {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }
}

/// Applies `spec` to the `source` series of `snapshot`.
pub fn compute_derived(
    spec: &TransformSpec,
    snapshot: &DatasetSnapshot,
    source: &str,
    options: TransformOptions,
) -> ChartResult<DerivedSequence> {
    spec.validate()?;
    let raw = snapshot.require(source)?.values();

    let mut warnings = Vec::new();
    let mut display_lag = None;
    let values = match spec {
        TransformSpec::Identity => raw.to_vec(),
        TransformSpec::MovingAverage { window } => moving_average(raw, *window),
        TransformSpec::PolynomialTrend { order } => polynomial_trend(raw, *order),
        TransformSpec::Elasticity { window, price } => {
            let price = snapshot.require(price)?.values();
            elasticity(raw, price, *window)
        }
        TransformSpec::RuleExpression { text } => {
            let evaluation =
                evaluate_rule_text(text, snapshot, source, options.rule_failure_policy);
            warnings = evaluation.warnings;
            evaluation.values
        }
        TransformSpec::LagShift { offset } => match options.lag_mode {
            LagMode::DisplayOnly => {
                display_lag = Some(*offset);
                raw.to_vec()
            }
            LagMode::Shift => shift(raw, *offset),
        },
    };

    let derived = DerivedSequence {
        values,
        warnings,
        display_lag,
        snapshot_version: snapshot.version(),
    };
    debug!(
        kind = spec.kind_name(),
        source,
        len = derived.len(),
        present = derived.present_count(),
        warnings = derived.warnings.len(),
        "derived sequence computed"
    );
    Ok(derived)
}
