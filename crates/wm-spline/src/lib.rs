//! Parametric splines describing a worm body.
//!
//! Two curves share one parameter domain: the [`Centerline`] (`t -> (x, y)`)
//! and the [`WidthProfile`] (`t -> half-width`). Both are B-splines in the
//! `tck` form (knots, coefficients, degree) produced by upstream annotation.
//!
//! Besides evaluation this crate provides:
//! - derivative splines and unit normals ([`Frenet`]),
//! - arc length by Gauss-Legendre quadrature and its inverse
//!   ([`ArcLengthTable`]),
//! - interpolating / least-squares fits ([`fit`], [`fit_profile`]),
//! - body outlines ([`outline`]).

mod arc;
mod bspline;
mod error;
mod fit;
mod outline;

pub use arc::{ArcLengthTable, DEFAULT_SUBDIVISIONS, arc_length};
pub use bspline::{BSpline, Centerline, Frenet, MAX_DEGREE, WidthProfile};
pub use error::SplineError;
pub use fit::{FitConfig, fit, fit_profile};
pub use outline::{Outline, outline};
