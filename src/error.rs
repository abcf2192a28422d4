use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unsupported period unit: {0}")]
    UnsupportedPeriodUnit(String),

    #[error("invalid transform: {0}")]
    InvalidTransform(String),

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("unknown series: {0}")]
    UnknownSeries(String),

    #[error("display range is degenerate")]
    DegenerateRange,

    #[error("point edit rejected: {0}")]
    EditRejected(EditRejection),
}

/// Reason a point edit was refused by the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum EditRejection {
    #[error("timestep {timestep} lies in the original region")]
    OriginalRegion { timestep: usize },
    #[error("timestep {timestep} is outside the span of length {len}")]
    OutOfRange { timestep: usize, len: usize },
    #[error("series index {index} does not exist")]
    UnknownSeries { index: usize },
    #[error("edited value must be finite")]
    NonFiniteValue,
    #[error("projection is flat and cannot be inverted")]
    DegenerateProjection,
}

impl From<EditRejection> for ChartError {
    fn from(reason: EditRejection) -> Self {
        Self::EditRejected(reason)
    }
}
