//! Spline-guided resampling of worm images.
//!
//! A worm is described by a centerline and a half-width profile over a
//! shared parameter. Straightening samples the source image along normal
//! cross-sections of the centerline:
//!
//! - Rows are evenly spaced in arc length, `round(length / longitudinal_step)`
//!   of them (at least two), head first.
//! - Columns span `target_width = width_margin * max(half-width)` across,
//!   `round(target_width / transverse_step)` of them, placed by
//!   [`transverse_offset`].
//! - Cells are bilinearly interpolated; coordinates off the image go
//!   through the configured border mode (reflect by default).
//!
//! [`build_mask`] marks cells within the worm's half-width using the same
//! row parameters and column offsets, so mask and grid never drift apart.
//!
//! [`standardize`] samples the same worm onto a [`CanonicalProfile`] grid:
//! the canonical length sets the rows, the canonical width sets the columns
//! and scales each cross-section, while the mask still follows the worm's
//! own width.

mod config;
mod error;
mod frame;
mod mask;
mod render;
mod sampler;
mod standardize;

pub use config::WarpConfig;
pub use error::WarpError;
pub use frame::{
    CenterlinePath, MAX_GRID_SIDE, MIN_ARC_LENGTH, SamplingFrame, target_width, transverse_offset,
};
pub use mask::{apply_mask, build_mask, mask_to_u8};
pub use render::{OUTLINE_POINTS, fill_polygon, render_body_mask};
pub use sampler::{Warp, sample, straighten};
pub use standardize::{CanonicalProfile, standardize};
