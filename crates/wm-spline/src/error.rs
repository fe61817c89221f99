use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SplineError {
    UnsupportedDegree(usize),
    NonMonotonicKnots,
    NonFiniteValue,
    TooFewCoefficients { expected: usize, actual: usize },
    EmptyDomain,
    /// `fit` input was malformed (`reason` says how).
    InvalidFitInput(&'static str),
    FitFailed,
}

impl fmt::Display for SplineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDegree(k) => write!(f, "unsupported spline degree {k}"),
            Self::NonMonotonicKnots => write!(f, "knot vector is not non-decreasing"),
            Self::NonFiniteValue => write!(f, "spline contains a non-finite knot or coefficient"),
            Self::TooFewCoefficients { expected, actual } => {
                write!(f, "too few coefficients: expected {expected}, got {actual}")
            }
            Self::EmptyDomain => write!(f, "spline parameter domain is empty"),
            Self::InvalidFitInput(reason) => write!(f, "invalid fit input: {reason}"),
            Self::FitFailed => write!(f, "least-squares spline fit did not converge"),
        }
    }
}

impl std::error::Error for SplineError {}
