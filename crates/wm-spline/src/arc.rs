use crate::bspline::{Centerline, Frenet};

// 5-point Gauss-Legendre nodes and weights on [-1, 1].
const GL_NODES: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683,
    0.0,
    0.538_469_310_105_683,
    0.906_179_845_938_664,
];
const GL_WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189,
    0.478_628_670_499_366,
    0.568_888_888_888_889,
    0.478_628_670_499_366,
    0.236_926_885_056_189,
];

pub const DEFAULT_SUBDIVISIONS: usize = 8;

fn integrate_speed(frenet: &Frenet<'_>, a: f64, b: f64) -> f64 {
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);
    GL_NODES
        .iter()
        .zip(GL_WEIGHTS)
        .map(|(&x, w)| w * frenet.speed(mid + half * x))
        .sum::<f64>()
        * half
}

/// Total curve length in pixels.
pub fn arc_length(curve: &Centerline) -> f64 {
    ArcLengthTable::new(curve, DEFAULT_SUBDIVISIONS).total()
}

/// Cumulative arc length at breakpoints along the curve.
///
/// Breakpoints are the knots inside the domain, each span split into
/// `subdivisions` equal parameter steps. Between breakpoints the
/// length-to-parameter map is treated as linear.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcLengthTable {
    params: Vec<f64>,
    lengths: Vec<f64>,
}

impl ArcLengthTable {
    pub fn new(curve: &Centerline, subdivisions: usize) -> Self {
        let frenet = Frenet::new(curve);
        let subdivisions = subdivisions.max(1);
        let (a, b) = curve.domain();

        let mut breaks: Vec<f64> = curve
            .knots()
            .iter()
            .copied()
            .filter(|&u| u > a && u < b)
            .collect();
        breaks.insert(0, a);
        breaks.push(b);
        breaks.dedup();

        let mut params = vec![a];
        let mut lengths = vec![0.0];
        for span in breaks.windows(2) {
            let step = (span[1] - span[0]) / subdivisions as f64;
            for i in 0..subdivisions {
                let lo = span[0] + step * i as f64;
                let hi = if i + 1 == subdivisions { span[1] } else { lo + step };
                let acc = lengths[lengths.len() - 1] + integrate_speed(&frenet, lo, hi);
                params.push(hi);
                lengths.push(acc);
            }
        }

        Self { params, lengths }
    }

    pub fn total(&self) -> f64 {
        self.lengths[self.lengths.len() - 1]
    }

    /// Parameter at arc length `s` from the start; `s` is clamped to
    /// `[0, total]`.
    pub fn param_at_length(&self, s: f64) -> f64 {
        let s = s.clamp(0.0, self.total());
        let idx = self.lengths.partition_point(|&l| l < s);
        if idx == 0 {
            return self.params[0];
        }
        let (l0, l1) = (self.lengths[idx - 1], self.lengths[idx]);
        let (p0, p1) = (self.params[idx - 1], self.params[idx]);
        if l1 <= l0 {
            return p1;
        }
        p0 + (s - l0) / (l1 - l0) * (p1 - p0)
    }

    /// Parameter at fraction `u` of the total length.
    pub fn param_at_fraction(&self, u: f64) -> f64 {
        self.param_at_length(u.clamp(0.0, 1.0) * self.total())
    }
}
