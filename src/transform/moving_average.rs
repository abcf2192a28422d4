use crate::core::SeriesValue;

/// Trailing moving average over `window` samples.
///
/// Windows are clipped at the start of the series. Any absent sample inside
/// a window makes that entry absent rather than being skipped.
#[must_use]
pub fn moving_average(values: &[SeriesValue], window: usize) -> Vec<SeriesValue> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            let sum = slice.iter().try_fold(0.0, |acc, value| value.map(|v| acc + v))?;
            Some(sum / slice.len() as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_windows_are_clipped() {
        let out = moving_average(&[Some(2.0), Some(4.0), Some(6.0), Some(8.0)], 3);
        assert_eq!(out, vec![Some(2.0), Some(3.0), Some(4.0), Some(6.0)]);
    }

    #[test]
    fn gap_poisons_every_window_containing_it() {
        let out = moving_average(&[Some(1.0), None, Some(3.0), Some(5.0), Some(7.0)], 2);
        assert_eq!(out, vec![Some(1.0), None, None, Some(4.0), Some(6.0)]);
    }
}
