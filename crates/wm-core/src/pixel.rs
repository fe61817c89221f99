/// Scalar pixel types the warps can read and write.
///
/// Sampling happens in `f64`; results are converted back to the source bit
/// depth with rounding and saturation for integer types.
pub trait Pixel: Copy + Default + Send + Sync + 'static {
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

impl Pixel for u8 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            return 0;
        }
        v.round().clamp(0.0, f64::from(u8::MAX)) as u8
    }
}

impl Pixel for u16 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            return 0;
        }
        v.round().clamp(0.0, f64::from(u16::MAX)) as u16
    }
}

impl Pixel for f32 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Pixel for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(v: f64) -> Self {
        v
    }
}
