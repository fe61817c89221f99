//! Umbrella crate for the `unit-worm` workspace.
//!
//! Re-exports the image primitives, the spline model, the warpers and the
//! cohort tools under one name.

pub use wm_cohort::*;
pub use wm_core::*;
pub use wm_spline::*;
pub use wm_warp::*;
