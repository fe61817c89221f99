use wm_core::{Point2d, Vec2d};
use wm_spline::{ArcLengthTable, Centerline, Frenet, WidthProfile};

use crate::{WarpConfig, WarpError};

/// Centerlines shorter than this (pixels) have no usable sampling frame.
pub const MIN_ARC_LENGTH: f64 = 1e-6;

/// Upper bound on rows and on columns of a sampling grid.
pub const MAX_GRID_SIDE: usize = 1 << 16;

/// Grid width in pixels: `width_margin * max(half-width)`.
///
/// Both the plain sampler and the standardizing warper derive their grid
/// width here, from the profile that controls their geometry.
pub fn target_width(width: &WidthProfile, cfg: &WarpConfig) -> Result<f64, WarpError> {
    let max = width.sampled_max(cfg.width_probe_samples);
    if !max.is_finite() {
        return Err(WarpError::NonFiniteProfile);
    }
    if max <= 0.0 {
        return Err(WarpError::DegenerateSpline("width profile is nowhere positive"));
    }
    Ok(cfg.width_margin * max)
}

/// Signed normal distance of transverse sample `j` out of `cols`:
/// `(j - (cols - 1) / 2) / cols * target_width`.
///
/// The sampler, the mask and the standardizing warper all place columns
/// with this function.
pub fn transverse_offset(j: usize, cols: usize, target_width: f64) -> f64 {
    let center = (cols as f64 - 1.0) * 0.5;
    (j as f64 - center) / cols as f64 * target_width
}

/// Centerline with arc-length parameterization and normals.
#[derive(Debug, Clone)]
pub struct CenterlinePath<'a> {
    frenet: Frenet<'a>,
    arc: ArcLengthTable,
}

impl<'a> CenterlinePath<'a> {
    /// Fails with `DegenerateSpline` when the curve has (near) zero length
    /// or no tangent.
    pub fn new(centerline: &'a Centerline, cfg: &WarpConfig) -> Result<Self, WarpError> {
        if centerline.degree() == 0 {
            return Err(WarpError::DegenerateSpline("centerline is piecewise constant"));
        }
        let arc = ArcLengthTable::new(centerline, cfg.arc_subdivisions);
        let total = arc.total();
        if !total.is_finite() {
            return Err(WarpError::DegenerateSpline("centerline length is not finite"));
        }
        if total <= MIN_ARC_LENGTH {
            return Err(WarpError::DegenerateSpline("centerline has zero arc length"));
        }

        Ok(Self {
            frenet: Frenet::new(centerline),
            arc,
        })
    }

    pub fn centerline(&self) -> &'a Centerline {
        self.frenet.curve()
    }

    pub fn length(&self) -> f64 {
        self.arc.total()
    }

    /// Spline parameter at fraction `u` of the arc length.
    pub fn param_at_fraction(&self, u: f64) -> f64 {
        self.arc.param_at_fraction(u)
    }

    /// Centre point and unit normal at parameter `t`.
    pub fn station(&self, t: f64) -> (Point2d, Vec2d) {
        (self.centerline().point(t), self.frenet.normal(t))
    }
}

/// Shape of a straightened grid and the centerline parameter of each row.
///
/// Rows are evenly spaced in arc length along the sampled worm, so row `i`
/// sits at fraction `i / (rows - 1)` of its length whatever the grid's own
/// length is.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingFrame {
    cols: usize,
    target_width: f64,
    row_params: Vec<f64>,
}

impl SamplingFrame {
    /// `length` sets the number of rows (the worm's own arc length for plain
    /// straightening, the canonical length when standardizing).
    pub fn new(
        path: &CenterlinePath<'_>,
        length: f64,
        target_width: f64,
        cfg: &WarpConfig,
    ) -> Result<Self, WarpError> {
        cfg.validate()?;
        if !length.is_finite() || !target_width.is_finite() {
            return Err(WarpError::NonFiniteProfile);
        }
        if length <= MIN_ARC_LENGTH {
            return Err(WarpError::DegenerateSpline("grid length must be positive"));
        }
        if target_width <= 0.0 {
            return Err(WarpError::DegenerateSpline("grid width must be positive"));
        }

        let rows = (length / cfg.longitudinal_step).round();
        let cols = (target_width / cfg.transverse_step).round();
        if rows > MAX_GRID_SIDE as f64 || cols > MAX_GRID_SIDE as f64 {
            return Err(WarpError::InvalidConfig(
                "sampling grid exceeds the maximum side length",
            ));
        }
        let rows = (rows as usize).max(2);
        let cols = (cols as usize).max(1);
        let row_params = (0..rows)
            .map(|i| path.param_at_fraction(i as f64 / (rows - 1) as f64))
            .collect();

        Ok(Self {
            cols,
            target_width,
            row_params,
        })
    }

    pub fn rows(&self) -> usize {
        self.row_params.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`: longitudinal by transverse samples.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols)
    }

    pub fn target_width(&self) -> f64 {
        self.target_width
    }

    pub fn row_params(&self) -> &[f64] {
        &self.row_params
    }

    pub fn offset(&self, j: usize) -> f64 {
        transverse_offset(j, self.cols, self.target_width)
    }
}
