use serde::{Deserialize, Serialize};

use crate::core::SeriesValue;

/// How the lag-shift transform treats its offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LagMode {
    /// Values pass through unchanged; the offset is display metadata only.
    #[default]
    DisplayOnly,
    /// `value[i] = source[i - offset]`, opening gaps at the vacated end.
    Shift,
}

/// Shifts `values` by `offset` timesteps; positive offsets delay the series.
#[must_use]
pub fn shift(values: &[SeriesValue], offset: i64) -> Vec<SeriesValue> {
    (0..values.len())
        .map(|i| {
            let source = i64::try_from(i).ok()?.checked_sub(offset)?;
            let source = usize::try_from(source).ok()?;
            values.get(source).copied().flatten()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_offset_opens_leading_gap() {
        let out = shift(&[Some(1.0), Some(2.0), Some(3.0)], 1);
        assert_eq!(out, vec![None, Some(1.0), Some(2.0)]);
    }

    #[test]
    fn negative_offset_opens_trailing_gap() {
        let out = shift(&[Some(1.0), Some(2.0), Some(3.0)], -2);
        assert_eq!(out, vec![Some(3.0), None, None]);
    }
}
