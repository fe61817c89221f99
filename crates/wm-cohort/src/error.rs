use core::fmt;

use wm_spline::SplineError;
use wm_warp::WarpError;

#[derive(Debug, Clone, PartialEq)]
pub enum CohortError {
    /// A required metadata key is absent (or null).
    MissingMetadataField(&'static str),
    /// A metadata value is present but unusable.
    InvalidMetadataField(&'static str),
    /// Metadata is not valid JSON for a worm record.
    Metadata(String),
    DomainMismatch {
        centerline: (f64, f64),
        width: (f64, f64),
    },
    /// No record has an age strictly inside the bounds.
    EmptyCohort { age_min: f64, age_max: f64 },
    NonFiniteProfile,
    InvalidConfig(&'static str),
    Spline(SplineError),
    Warp(WarpError),
}

impl fmt::Display for CohortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMetadataField(name) => write!(f, "metadata is missing `{name}`"),
            Self::InvalidMetadataField(name) => write!(f, "metadata field `{name}` is invalid"),
            Self::Metadata(msg) => write!(f, "malformed metadata: {msg}"),
            Self::DomainMismatch { centerline, width } => write!(
                f,
                "centerline domain [{}, {}] differs from width domain [{}, {}]",
                centerline.0, centerline.1, width.0, width.1
            ),
            Self::EmptyCohort { age_min, age_max } => {
                write!(f, "no worms with age strictly between {age_min} and {age_max} days")
            }
            Self::NonFiniteProfile => write!(f, "cohort average is not finite"),
            Self::InvalidConfig(reason) => write!(f, "invalid cohort configuration: {reason}"),
            Self::Spline(err) => write!(f, "spline error: {err}"),
            Self::Warp(err) => write!(f, "warp error: {err}"),
        }
    }
}

impl std::error::Error for CohortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spline(err) => Some(err),
            Self::Warp(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SplineError> for CohortError {
    fn from(err: SplineError) -> Self {
        Self::Spline(err)
    }
}

impl From<WarpError> for CohortError {
    fn from(err: WarpError) -> Self {
        Self::Warp(err)
    }
}
