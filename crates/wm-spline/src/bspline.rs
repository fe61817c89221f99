use wm_core::{Point2d, Vec2d};

use crate::SplineError;

pub const MAX_DEGREE: usize = 5;

/// B-spline in `tck` form: knot vector `t`, coefficients `c`, degree `k`.
///
/// The parameter domain is `[t[k], t[n]]` with `n = t.len() - k - 1`
/// coefficients. Parameters outside the domain are clamped onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct BSpline<const D: usize> {
    knots: Vec<f64>,
    coeffs: Vec<[f64; D]>,
    degree: usize,
}

/// Midline curve `t -> (x, y)` in image pixels.
pub type Centerline = BSpline<2>;

/// Half-width profile `t -> w`, centre to edge.
pub type WidthProfile = BSpline<1>;

impl<const D: usize> BSpline<D> {
    /// Validates and builds a spline. Coefficient lists longer than the knot
    /// vector implies (scipy pads them with zeros) are truncated.
    pub fn new(knots: Vec<f64>, mut coeffs: Vec<[f64; D]>, degree: usize) -> Result<Self, SplineError> {
        if degree > MAX_DEGREE {
            return Err(SplineError::UnsupportedDegree(degree));
        }
        if knots.iter().any(|v| !v.is_finite()) {
            return Err(SplineError::NonFiniteValue);
        }
        if knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(SplineError::NonMonotonicKnots);
        }

        let n = knots.len().saturating_sub(degree + 1);
        if n < degree + 1 || coeffs.len() < n {
            return Err(SplineError::TooFewCoefficients {
                expected: n.max(degree + 1),
                actual: coeffs.len(),
            });
        }
        coeffs.truncate(n);
        if coeffs.iter().flatten().any(|v| !v.is_finite()) {
            return Err(SplineError::NonFiniteValue);
        }
        if knots[degree] >= knots[n] {
            return Err(SplineError::EmptyDomain);
        }

        Ok(Self {
            knots,
            coeffs,
            degree,
        })
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn coeffs(&self) -> &[[f64; D]] {
        &self.coeffs
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.coeffs.len()])
    }

    /// Maps a fraction in `[0, 1]` linearly onto the parameter domain.
    pub fn param_at_fraction(&self, u: f64) -> f64 {
        let (a, b) = self.domain();
        a + u.clamp(0.0, 1.0) * (b - a)
    }

    /// Inverse of [`Self::param_at_fraction`].
    pub fn fraction_of_param(&self, t: f64) -> f64 {
        let (a, b) = self.domain();
        ((t - a) / (b - a)).clamp(0.0, 1.0)
    }

    /// Index `s` of the knot span holding `t`, with `k <= s < n`.
    pub(crate) fn find_span(&self, t: f64) -> usize {
        let n = self.coeffs.len();
        let s = self.knots.partition_point(|&u| u <= t);
        s.saturating_sub(1).clamp(self.degree, n - 1)
    }

    pub(crate) fn clamp_param(&self, t: f64) -> f64 {
        let (a, b) = self.domain();
        t.clamp(a, b)
    }

    /// De Boor evaluation.
    pub fn evaluate(&self, t: f64) -> [f64; D] {
        let t = self.clamp_param(t);
        let k = self.degree;
        let s = self.find_span(t);

        let mut d: Vec<[f64; D]> = self.coeffs[s - k..=s].to_vec();
        for r in 1..=k {
            for j in (r..=k).rev() {
                let left = self.knots[j + s - k];
                let right = self.knots[j + 1 + s - r];
                let denom = right - left;
                let alpha = if denom == 0.0 { 0.0 } else { (t - left) / denom };
                let prev = d[j - 1];
                for (dst, p) in d[j].iter_mut().zip(prev) {
                    *dst = (1.0 - alpha) * p + alpha * *dst;
                }
            }
        }
        d[k]
    }

    pub fn evaluate_many(&self, ts: &[f64]) -> Vec<[f64; D]> {
        ts.iter().map(|&t| self.evaluate(t)).collect()
    }

    /// `n` evaluations evenly spaced in parameter across the whole domain.
    pub fn interpolate(&self, n: usize) -> Vec<[f64; D]> {
        self.evaluate_many(&self.linspace(n))
    }

    /// `n` parameter values evenly spaced across the domain, endpoints
    /// included.
    pub fn linspace(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![self.domain().0],
            _ => (0..n)
                .map(|i| self.param_at_fraction(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }

    /// First derivative as a spline of degree `k - 1` on the same domain.
    ///
    /// A degree-0 spline differentiates to the zero constant.
    pub fn derivative(&self) -> Self {
        let k = self.degree;
        if k == 0 {
            return Self {
                knots: self.knots.clone(),
                coeffs: vec![[0.0; D]; self.coeffs.len()],
                degree: 0,
            };
        }

        let n = self.coeffs.len();
        let mut coeffs = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let denom = self.knots[i + k + 1] - self.knots[i + 1];
            let mut q = [0.0; D];
            if denom > 0.0 {
                let scale = k as f64 / denom;
                for (dim, out) in q.iter_mut().enumerate() {
                    *out = scale * (self.coeffs[i + 1][dim] - self.coeffs[i][dim]);
                }
            }
            coeffs.push(q);
        }

        Self {
            knots: self.knots[1..self.knots.len() - 1].to_vec(),
            coeffs,
            degree: k - 1,
        }
    }
}

impl BSpline<1> {
    pub fn value(&self, t: f64) -> f64 {
        self.evaluate(t)[0]
    }

    /// Maximum over `samples` evenly spaced evaluations.
    pub fn sampled_max(&self, samples: usize) -> f64 {
        self.interpolate(samples.max(2))
            .into_iter()
            .map(|[w]| w)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl BSpline<2> {
    pub fn point(&self, t: f64) -> Point2d {
        self.evaluate(t).into()
    }

    pub fn points(&self, ts: &[f64]) -> Vec<Point2d> {
        ts.iter().map(|&t| self.point(t)).collect()
    }
}

/// Centerline with its derivative precomputed, for repeated tangent queries.
#[derive(Debug, Clone)]
pub struct Frenet<'a> {
    curve: &'a Centerline,
    velocity: Centerline,
}

impl<'a> Frenet<'a> {
    pub fn new(curve: &'a Centerline) -> Self {
        Self {
            curve,
            velocity: curve.derivative(),
        }
    }

    pub fn curve(&self) -> &'a Centerline {
        self.curve
    }

    pub fn velocity(&self, t: f64) -> Vec2d {
        self.velocity.evaluate(t).into()
    }

    pub fn speed(&self, t: f64) -> f64 {
        self.velocity(t).norm()
    }

    /// Unit normal: the unit tangent turned +90 degrees. Zero where the
    /// curve has zero velocity.
    pub fn normal(&self, t: f64) -> Vec2d {
        self.velocity(t).normalize().perp()
    }
}

/// Non-zero basis functions `N[s-k..=s]` at `t` for knot span `s`
/// (The NURBS Book, A2.2).
pub(crate) fn basis_functions(knots: &[f64], span: usize, degree: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom == 0.0 { 0.0 } else { n[r] / denom };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}
