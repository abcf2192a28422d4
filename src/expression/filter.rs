use std::f64::consts::PI;

use crate::core::SeriesValue;
use crate::error::{ChartError, ChartResult};

/// Spectral band filter over a whole series.
///
/// Keeps the DFT bins whose frequency, expressed as a fraction of the Nyquist
/// frequency, lies within `[low, high]` and discards the rest. `filter(s, 0, 1)`
/// reproduces the input; `filter(s, 0, 0)` keeps only the mean.
///
/// Absent samples are bridged by linear interpolation before the transform
/// and stay absent in the output.
pub fn band_filter(values: &[SeriesValue], low: f64, high: f64) -> ChartResult<Vec<SeriesValue>> {
    if !low.is_finite() || !high.is_finite() || low < 0.0 || high > 1.0 || low > high {
        return Err(ChartError::InvalidExpression(format!(
            "filter cutoffs must satisfy 0 <= low <= high <= 1, got low={low} high={high}"
        )));
    }

    let Some(filled) = fill_gaps(values) else {
        return Ok(vec![None; values.len()]);
    };

    let n = filled.len();
    let signal: Vec<(f64, f64)> = filled.into_iter().map(|x| (x, 0.0)).collect();
    let kept: Vec<(f64, f64)> = dft(&signal, false)
        .into_iter()
        .enumerate()
        .map(|(k, bin)| {
            let frequency = 2.0 * k.min(n - k) as f64 / n as f64;
            if frequency >= low && frequency <= high {
                bin
            } else {
                (0.0, 0.0)
            }
        })
        .collect();
    let restored = dft(&kept, true);

    Ok(values
        .iter()
        .zip(restored)
        .map(|(original, (re, _))| original.map(|_| re / n as f64))
        .collect())
}

/// Naive DFT over complex samples; `inverse` flips the exponent sign and
/// leaves normalization to the caller.
fn dft(input: &[(f64, f64)], inverse: bool) -> Vec<(f64, f64)> {
    let n = input.len();
    let sign = if inverse { 1.0 } else { -1.0 };
    (0..n)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(acc_re, acc_im), (t, &(re, im))| {
                    let angle = sign * 2.0 * PI * ((k * t) % n) as f64 / n as f64;
                    let (sin, cos) = angle.sin_cos();
                    (acc_re + re * cos - im * sin, acc_im + re * sin + im * cos)
                })
        })
        .collect()
}

fn fill_gaps(values: &[SeriesValue]) -> Option<Vec<f64>> {
    let present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.map(|v| (idx, v)))
        .collect();
    let (&(first_idx, first), &(last_idx, last)) = (present.first()?, present.last()?);

    let mut filled = Vec::with_capacity(values.len());
    let mut segment = 0usize;
    for idx in 0..values.len() {
        let value = if idx <= first_idx {
            first
        } else if idx >= last_idx {
            last
        } else {
            while present[segment + 1].0 < idx {
                segment += 1;
            }
            let (x0, y0) = present[segment];
            let (x1, y1) = present[segment + 1];
            y0 + (y1 - y0) * (idx - x0) as f64 / (x1 - x0) as f64
        };
        filled.push(value);
    }
    Some(filled)
}
