use smallvec::SmallVec;

use crate::core::SeriesValue;

pub const MIN_POLYNOMIAL_ORDER: usize = 1;
pub const MAX_POLYNOMIAL_ORDER: usize = 17;

type Coefficients = SmallVec<[f64; MAX_POLYNOMIAL_ORDER + 1]>;

/// Least-squares polynomial fitted on a normalized abscissa.
///
/// Indices are mapped to `t = (x - center) / half_range` before fitting so
/// high orders stay well conditioned.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFit {
    coefficients: Coefficients,
    center: f64,
    half_range: f64,
}

impl PolynomialFit {
    /// Fits `order` to the present `(index, value)` pairs.
    ///
    /// The effective degree drops to `points - 1` when there are fewer points
    /// than coefficients. Returns `None` when no value is present.
    #[must_use]
    pub fn fit(values: &[SeriesValue], order: usize) -> Option<Self> {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .filter_map(|(x, value)| value.map(|v| (x as f64, v)))
            .collect();
        if points.is_empty() {
            return None;
        }

        let degree = order.min(points.len() - 1);
        let (min_x, max_x) = (points[0].0, points[points.len() - 1].0);
        let center = (min_x + max_x) / 2.0;
        let half_range = if max_x > min_x {
            (max_x - min_x) / 2.0
        } else {
            1.0
        };

        let design: Vec<Vec<f64>> = points
            .iter()
            .map(|&(x, _)| {
                let t = (x - center) / half_range;
                std::iter::successors(Some(1.0), |power| Some(power * t))
                    .take(degree + 1)
                    .collect()
            })
            .collect();
        let targets: Vec<f64> = points.iter().map(|&(_, y)| y).collect();

        Some(Self {
            coefficients: solve_least_squares(design, targets, degree + 1),
            center,
            half_range,
        })
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluates the polynomial at index `x` using Horner's scheme.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.half_range;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, coefficient| acc * t + coefficient)
    }
}

/// Fits and evaluates the trend at every timestep of the span, filling
/// absent entries by interpolation or extrapolation.
#[must_use]
pub fn polynomial_trend(values: &[SeriesValue], order: usize) -> Vec<SeriesValue> {
    let Some(fit) = PolynomialFit::fit(values, order) else {
        return vec![None; values.len()];
    };
    (0..values.len())
        .map(|x| {
            let y = fit.evaluate(x as f64);
            y.is_finite().then_some(y)
        })
        .collect()
}

/// Householder QR least squares for an `m x p` row-major design matrix.
///
/// Rank-deficient columns receive a zero coefficient.
fn solve_least_squares(mut a: Vec<Vec<f64>>, mut b: Vec<f64>, p: usize) -> Coefficients {
    let m = a.len();
    let mut diagonal_scale = 0.0f64;

    for k in 0..p.min(m) {
        let norm = (k..m).map(|i| a[i][k] * a[i][k]).sum::<f64>().sqrt();
        if norm == 0.0 {
            continue;
        }
        let alpha = if a[k][k] > 0.0 { -norm } else { norm };
        let mut v: Vec<f64> = (k..m).map(|i| a[i][k]).collect();
        v[0] -= alpha;
        let v_norm_sq: f64 = v.iter().map(|x| x * x).sum();
        if v_norm_sq == 0.0 {
            continue;
        }

        for j in k..p {
            let dot: f64 = (k..m).map(|i| v[i - k] * a[i][j]).sum();
            let factor = 2.0 * dot / v_norm_sq;
            for i in k..m {
                a[i][j] -= factor * v[i - k];
            }
        }
        let dot: f64 = (k..m).map(|i| v[i - k] * b[i]).sum();
        let factor = 2.0 * dot / v_norm_sq;
        for i in k..m {
            b[i] -= factor * v[i - k];
        }
        diagonal_scale = diagonal_scale.max(a[k][k].abs());
    }

    let tolerance = diagonal_scale * 1e-12;
    let mut coefficients: Coefficients = SmallVec::from_elem(0.0, p);
    for k in (0..p.min(m)).rev() {
        let pivot = a[k][k];
        if pivot.abs() <= tolerance {
            continue;
        }
        let tail: f64 = (k + 1..p).map(|j| a[k][j] * coefficients[j]).sum();
        coefficients[k] = (b[k] - tail) / pivot;
    }
    coefficients
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_is_recovered() {
        let values: Vec<SeriesValue> = (0..8).map(|x| Some(2.0 + 0.5 * f64::from(x).powi(2))).collect();
        let fit = PolynomialFit::fit(&values, 2).expect("fit");
        assert!((fit.evaluate(10.0) - 52.0).abs() < 1e-8);
    }

    #[test]
    fn degree_drops_for_sparse_data() {
        let fit = PolynomialFit::fit(&[None, Some(4.0), None], 5).expect("fit");
        assert_eq!(fit.degree(), 0);
        assert!((fit.evaluate(7.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn all_absent_yields_all_absent() {
        assert_eq!(polynomial_trend(&[None, None], 1), vec![None, None]);
    }
}
