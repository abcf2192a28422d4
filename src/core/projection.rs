use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::label_format::{LabelLocale, UNKNOWN_LABEL, format_extreme_label};
use super::series::SeriesValue;
use super::types::Viewport;
use crate::error::{ChartError, ChartResult};

/// Affine map from derived values into the normalized `[0, 1]` display range.
///
/// The maximum finite value maps to `1` and the minimum to `0`. A flat or
/// empty sequence yields `scale == 0` and `offset == 0`, collapsing every
/// value onto the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayProjection {
    min: f64,
    max: f64,
    scale: f64,
    offset: f64,
}

impl Default for DisplayProjection {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            scale: 0.0,
            offset: 0.0,
        }
    }
}

impl DisplayProjection {
    /// Fits the projection to the present finite values of a sequence.
    #[must_use]
    pub fn from_values(values: &[SeriesValue]) -> Self {
        let finite = || {
            values
                .iter()
                .filter_map(|value| *value)
                .filter(|value| value.is_finite())
                .map(OrderedFloat)
        };
        let (Some(min), Some(max)) = (finite().min(), finite().max()) else {
            return Self::default();
        };
        Self::from_extremes(min.0, max.0)
    }

    #[must_use]
    pub fn from_extremes(min: f64, max: f64) -> Self {
        let span = max - min;
        if span == 0.0 || !span.is_finite() {
            return Self {
                min,
                max,
                scale: 0.0,
                offset: 0.0,
            };
        }
        Self {
            min,
            max,
            scale: 1.0 / span,
            offset: 1.0 - max / span,
        }
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn scale(self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn offset(self) -> f64 {
        self.offset
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.scale == 0.0
    }

    /// Normalized display value of `value`.
    #[must_use]
    pub fn project(self, value: f64) -> f64 {
        self.scale * value + self.offset
    }

    #[must_use]
    pub fn project_sequence(self, values: &[SeriesValue]) -> Vec<SeriesValue> {
        values
            .iter()
            .map(|value| value.map(|v| self.project(v)))
            .collect()
    }

    /// Maps a value to a vertical pixel, `0` at the top of the viewport.
    pub fn value_to_pixel(self, value: f64, viewport: Viewport) -> ChartResult<f64> {
        validate_viewport(viewport)?;
        if !value.is_finite() {
            return Err(ChartError::InvalidData("value must be finite".to_owned()));
        }
        Ok((1.0 - self.project(value)) * f64::from(viewport.height))
    }

    /// Inverse of [`value_to_pixel`](Self::value_to_pixel).
    ///
    /// Fails with `DegenerateRange` when the projection is flat.
    pub fn pixel_to_value(self, pixel_y: f64, viewport: Viewport) -> ChartResult<f64> {
        validate_viewport(viewport)?;
        if !pixel_y.is_finite() {
            return Err(ChartError::InvalidData("pixel must be finite".to_owned()));
        }
        if self.is_degenerate() {
            return Err(ChartError::DegenerateRange);
        }
        let normalized = 1.0 - pixel_y / f64::from(viewport.height);
        Ok((normalized - self.offset) / self.scale)
    }

    /// Formats min/max labels.
    ///
    /// When either extreme cannot be formatted both labels fall back to
    /// [`UNKNOWN_LABEL`] and the extremes reset to zero.
    pub fn format_labels(&mut self, locale: LabelLocale) -> ProjectionLabels {
        match (
            format_extreme_label(self.min, locale),
            format_extreme_label(self.max, locale),
        ) {
            (Ok(min), Ok(max)) => ProjectionLabels { min, max },
            _ => {
                self.min = 0.0;
                self.max = 0.0;
                ProjectionLabels {
                    min: UNKNOWN_LABEL.to_owned(),
                    max: UNKNOWN_LABEL.to_owned(),
                }
            }
        }
    }
}

/// Formatted extreme labels drawn next to the plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionLabels {
    pub min: String,
    pub max: String,
}

fn validate_viewport(viewport: Viewport) -> ChartResult<()> {
    if viewport.is_valid() {
        Ok(())
    } else {
        Err(ChartError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        })
    }
}
