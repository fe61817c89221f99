use core::fmt;

use wm_spline::SplineError;

#[derive(Debug, Clone, PartialEq)]
pub enum WarpError {
    /// Geometry that cannot define a sampling frame.
    DegenerateSpline(&'static str),
    /// NaN/infinite canonical width or length.
    NonFiniteProfile,
    EmptyImage,
    InvalidConfig(&'static str),
    Spline(SplineError),
}

impl fmt::Display for WarpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateSpline(reason) => write!(f, "degenerate spline: {reason}"),
            Self::NonFiniteProfile => write!(f, "canonical profile contains non-finite values"),
            Self::EmptyImage => write!(f, "source image has no pixels"),
            Self::InvalidConfig(reason) => write!(f, "invalid warp configuration: {reason}"),
            Self::Spline(err) => write!(f, "spline error: {err}"),
        }
    }
}

impl std::error::Error for WarpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SplineError> for WarpError {
    fn from(err: SplineError) -> Self {
        Self::Spline(err)
    }
}
