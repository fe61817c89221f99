use wm_core::BorderMode;

use crate::WarpError;

/// Sampling resolution and border policy, shared by the sampler, the mask
/// generator and the standardizing warper.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpConfig {
    /// Arc length (pixels) between longitudinal samples.
    pub longitudinal_step: f64,
    /// Normal distance (pixels) between transverse samples.
    pub transverse_step: f64,
    /// Grid width as a multiple of the largest half-width. `2.0` spans the
    /// widest cross-section edge to edge.
    pub width_margin: f64,
    /// Evaluations used to find the largest half-width.
    pub width_probe_samples: usize,
    /// Quadrature sub-steps per knot span when tabulating arc length.
    pub arc_subdivisions: usize,
    pub border: BorderMode<f64>,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            longitudinal_step: 1.0,
            transverse_step: 1.0,
            width_margin: 2.0,
            width_probe_samples: 100,
            arc_subdivisions: wm_spline::DEFAULT_SUBDIVISIONS,
            border: BorderMode::Reflect,
        }
    }
}

impl WarpConfig {
    pub fn validate(&self) -> Result<(), WarpError> {
        if !(self.longitudinal_step.is_finite() && self.longitudinal_step > 0.0) {
            return Err(WarpError::InvalidConfig("longitudinal_step must be positive"));
        }
        if !(self.transverse_step.is_finite() && self.transverse_step > 0.0) {
            return Err(WarpError::InvalidConfig("transverse_step must be positive"));
        }
        if !(self.width_margin.is_finite() && self.width_margin > 0.0) {
            return Err(WarpError::InvalidConfig("width_margin must be positive"));
        }
        if self.width_probe_samples < 2 {
            return Err(WarpError::InvalidConfig("width_probe_samples must be at least 2"));
        }
        Ok(())
    }
}
