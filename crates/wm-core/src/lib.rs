//! Foundational primitives for straightening worm images.
//!
//! ## Images
//! `Image<T>` is an owned row-major raster; `ImageView` borrows one for
//! sampling. Straightened grids store one row per longitudinal sample and
//! one column per transverse sample.
//!
//! ## Sampling Coordinates
//! Integer coordinates refer to pixel centres. Bilinear sampling uses the
//! floor-based 2x2 neighbourhood; neighbours outside the image go through a
//! [`BorderMode`], so sampling never indexes out of bounds.
//!
//! ## Pixel Depth
//! [`Pixel`] converts between the stored bit depth and the `f64` used for
//! interpolation.

mod border;
mod error;
mod geom;
mod image;
mod pixel;
mod sample;

pub use border::{BorderMode, map_index};
pub use error::Error;
pub use geom::{Point2d, Polyline2d, Vec2d};
pub use image::{Image, ImageView};
pub use pixel::Pixel;
pub use sample::sample_bilinear;
