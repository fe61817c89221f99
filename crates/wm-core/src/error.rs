use core::fmt;

/// Raster construction failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer length does not cover `width x height` pixels.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "pixel buffer holds {actual} samples, raster needs {expected}")
            }
        }
    }
}

impl std::error::Error for Error {}
