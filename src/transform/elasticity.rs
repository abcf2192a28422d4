use crate::core::SeriesValue;

/// Arc elasticity of `quantity` with respect to `price` over `window` steps.
///
/// For timestep `x` with `(q0, p0)` at `x` and `(q1, p1)` at `x - window`:
/// `((q0 - q1)(p0 + p1)) / ((p0 - p1)(q0 + q1))`. Entries before the first
/// full window, with missing samples, or with a zero denominator are absent.
#[must_use]
pub fn elasticity(
    quantity: &[SeriesValue],
    price: &[SeriesValue],
    window: usize,
) -> Vec<SeriesValue> {
    (0..quantity.len())
        .map(|x| {
            let back = x.checked_sub(window)?;
            let (q0, p0) = (quantity[x]?, price.get(x).copied().flatten()?);
            let (q1, p1) = (quantity[back]?, price.get(back).copied().flatten()?);
            let denominator = (p0 - p1) * (q0 + q1);
            if denominator == 0.0 {
                return None;
            }
            let ratio = ((q0 - q1) * (p0 + p1)) / denominator;
            ratio.is_finite().then_some(ratio)
        })
        .collect()
}
