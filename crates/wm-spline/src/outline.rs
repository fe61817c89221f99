use wm_core::{Point2d, Polyline2d};

use crate::bspline::{Centerline, Frenet, WidthProfile};

/// Body edges traced at `center ± normal * half_width`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outline {
    pub left: Vec<Point2d>,
    pub right: Vec<Point2d>,
}

impl Outline {
    /// Closed polygon: left edge head to tail, then right edge tail to head.
    pub fn polygon(&self) -> Polyline2d {
        let mut points = self.left.clone();
        points.extend(self.right.iter().rev().copied());
        Polyline2d { points }
    }
}

/// Samples the outline at `n_points` parameters evenly spaced over the
/// centerline domain. The width profile is evaluated at the same parameters.
pub fn outline(centerline: &Centerline, width: &WidthProfile, n_points: usize) -> Outline {
    let frenet = Frenet::new(centerline);
    let mut out = Outline {
        left: Vec::with_capacity(n_points),
        right: Vec::with_capacity(n_points),
    };

    for t in centerline.linspace(n_points) {
        let center = centerline.point(t);
        let offset = frenet.normal(t) * width.value(t);
        out.left.push(center + offset);
        out.right.push(center - offset);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::outline;
    use crate::bspline::{BSpline, Centerline, WidthProfile};

    #[test]
    fn horizontal_body_outline() {
        let c: Centerline =
            BSpline::new(vec![0.0, 0.0, 1.0, 1.0], vec![[0.0, 10.0], [40.0, 10.0]], 1)
                .expect("valid spline");
        let w: WidthProfile =
            BSpline::new(vec![0.0, 0.0, 1.0, 1.0], vec![[2.0], [4.0]], 1).expect("valid spline");

        let o = outline(&c, &w, 5);
        assert_eq!(o.left.len(), 5);
        assert!((o.left[0].y - 12.0).abs() < 1e-12);
        assert!((o.right[4].y - 6.0).abs() < 1e-12);
        assert!((o.left[2].x - 20.0).abs() < 1e-12);

        let poly = o.polygon();
        assert_eq!(poly.points.len(), 10);
        assert_eq!(poly.points[5], o.right[4]);
        assert_eq!(poly.points[9], o.right[0]);
    }
}
