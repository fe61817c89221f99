use nalgebra::DMatrix;

use crate::SplineError;
use crate::bspline::{BSpline, WidthProfile, basis_functions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitConfig {
    pub degree: usize,
    /// `None` interpolates through every point. `Some(n)` fits `n`
    /// coefficients by least squares (clamped to `[degree + 1, points]`).
    pub max_coefficients: Option<usize>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            degree: 3,
            max_coefficients: None,
        }
    }
}

/// Fits a clamped B-spline through `(xs[i], ys[i])`.
///
/// `xs` must be finite and strictly increasing; the fitted domain is
/// `[xs[0], xs[last]]`. The degree drops to `points - 1` when there are too
/// few points for the requested one.
pub fn fit<const D: usize>(
    xs: &[f64],
    ys: &[[f64; D]],
    cfg: &FitConfig,
) -> Result<BSpline<D>, SplineError> {
    let m = xs.len();
    if m != ys.len() {
        return Err(SplineError::InvalidFitInput("xs and ys differ in length"));
    }
    if m < 2 {
        return Err(SplineError::InvalidFitInput("at least two points are required"));
    }
    if xs.iter().chain(ys.iter().flatten()).any(|v| !v.is_finite()) {
        return Err(SplineError::NonFiniteValue);
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(SplineError::InvalidFitInput("xs must be strictly increasing"));
    }

    let degree = cfg.degree.clamp(1, crate::bspline::MAX_DEGREE).min(m - 1);
    let n = cfg
        .max_coefficients
        .map_or(m, |c| c.clamp(degree + 1, m));
    let knots = if n == m {
        averaged_knots(xs, degree)
    } else {
        quantile_knots(xs, degree, n)
    };

    let mut a = DMatrix::<f64>::zeros(m, n);
    let mut b = DMatrix::<f64>::zeros(m, D);
    let shape = BSpline::<D>::new(knots.clone(), vec![[0.0; D]; n], degree)?;
    for (row, (&x, y)) in xs.iter().zip(ys).enumerate() {
        let span = shape.find_span(x);
        for (j, v) in basis_functions(&knots, span, degree, x).into_iter().enumerate() {
            a[(row, span - degree + j)] = v;
        }
        for (dim, &v) in y.iter().enumerate() {
            b[(row, dim)] = v;
        }
    }

    let solution = a
        .svd(true, true)
        .solve(&b, 1e-12)
        .map_err(|_| SplineError::FitFailed)?;

    let coeffs: Vec<[f64; D]> = (0..n)
        .map(|i| std::array::from_fn(|dim| solution[(i, dim)]))
        .collect();
    BSpline::new(knots, coeffs, degree)
}

/// Scalar convenience wrapper around [`fit`].
pub fn fit_profile(xs: &[f64], ys: &[f64], cfg: &FitConfig) -> Result<WidthProfile, SplineError> {
    let ys: Vec<[f64; 1]> = ys.iter().map(|&y| [y]).collect();
    fit(xs, &ys, cfg)
}

fn clamped(xs: &[f64], degree: usize, interior: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let first = xs[0];
    let last = xs[xs.len() - 1];
    let mut knots = vec![first; degree + 1];
    knots.extend(interior);
    knots.extend(std::iter::repeat_n(last, degree + 1));
    knots
}

// de Boor knot averaging: keeps the collocation matrix non-singular.
fn averaged_knots(xs: &[f64], degree: usize) -> Vec<f64> {
    let m = xs.len();
    let interior = (1..m - degree).map(|j| xs[j..j + degree].iter().sum::<f64>() / degree as f64);
    clamped(xs, degree, interior)
}

fn quantile_knots(xs: &[f64], degree: usize, n: usize) -> Vec<f64> {
    let m = xs.len();
    let count = n - degree - 1;
    let interior = (1..=count).map(|j| {
        let pos = j as f64 * (m - 1) as f64 / (count + 1) as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(m - 1);
        let frac = pos - lo as f64;
        xs[lo] + frac * (xs[hi] - xs[lo])
    });
    clamped(xs, degree, interior)
}
