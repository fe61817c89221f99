use wm_core::{ImageView, Pixel};
use wm_spline::{Centerline, WidthProfile};

use crate::frame::{CenterlinePath, SamplingFrame, target_width};
use crate::mask::build_mask;
use crate::sampler::{Warp, resample};
use crate::{WarpConfig, WarpError};

/// Population-average body shape: a half-width profile over a normalized
/// domain plus a centerline length in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalProfile {
    width: WidthProfile,
    length: f64,
}

impl CanonicalProfile {
    pub fn new(width: WidthProfile, length: f64) -> Result<Self, WarpError> {
        if !length.is_finite() {
            return Err(WarpError::NonFiniteProfile);
        }
        if length <= 0.0 {
            return Err(WarpError::DegenerateSpline("canonical length must be positive"));
        }
        Ok(Self { width, length })
    }

    /// The profile of a single worm: its own width and arc length.
    pub fn of_worm(
        centerline: &Centerline,
        width: &WidthProfile,
        cfg: &WarpConfig,
    ) -> Result<Self, WarpError> {
        let path = CenterlinePath::new(centerline, cfg)?;
        Self::new(width.clone(), path.length())
    }

    pub fn width(&self) -> &WidthProfile {
        &self.width
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Canonical half-width at fraction `u` of the domain.
    pub fn half_width_at(&self, u: f64) -> f64 {
        self.width.value(self.width.param_at_fraction(u))
    }
}

/// Warps one worm onto the canonical grid.
///
/// Rows follow `canonical.length()` and columns follow
/// `target_width(canonical.width())`; row `i` still samples the worm at
/// fraction `i / (rows - 1)` of its own arc length. Within a row the
/// transverse offsets are scaled by `own_width / canonical_width` at that
/// position, so the body edge of the worm lands on the canonical edge. Where
/// the canonical width is zero the scale is one.
///
/// The returned mask comes from the worm's own width profile: the canonical
/// profile only decides where pixels are drawn from.
pub fn standardize<T: Pixel>(
    image: &ImageView<'_, T>,
    centerline: &Centerline,
    width: &WidthProfile,
    canonical: &CanonicalProfile,
    cfg: &WarpConfig,
) -> Result<Warp<T>, WarpError> {
    if image.is_empty() {
        return Err(WarpError::EmptyImage);
    }
    let path = CenterlinePath::new(centerline, cfg)?;
    let frame = SamplingFrame::new(
        &path,
        canonical.length(),
        target_width(canonical.width(), cfg)?,
        cfg,
    )?;

    let row_scale: Vec<f64> = frame
        .row_params()
        .iter()
        .map(|&t| {
            let own = width.value(t);
            let target = canonical.half_width_at(centerline.fraction_of_param(t));
            if target > 0.0 { own / target } else { 1.0 }
        })
        .collect();
    if row_scale.iter().any(|s| !s.is_finite()) {
        return Err(WarpError::NonFiniteProfile);
    }

    Ok(Warp {
        image: resample(image, &path, &frame, &row_scale, &cfg.border),
        mask: build_mask(&frame, width),
    })
}
