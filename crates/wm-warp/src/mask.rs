use wm_core::{Image, Pixel};
use wm_spline::WidthProfile;

use crate::frame::SamplingFrame;

/// Validity mask for a grid laid out by `frame`.
///
/// Cell `(i, j)` is inside the body iff `|offset(j)| <= width(t_i)`, where
/// `t_i` is the centerline parameter of row `i` and `offset` is the same
/// transverse placement the sampler uses.
pub fn build_mask(frame: &SamplingFrame, width: &WidthProfile) -> Image<bool> {
    let (rows, cols) = frame.shape();
    let mut mask = Image::new_fill(cols, rows, false);

    for (i, &t) in frame.row_params().iter().enumerate() {
        let half = width.value(t);
        for (j, cell) in mask.row_mut(i).iter_mut().enumerate() {
            *cell = frame.offset(j).abs() <= half;
        }
    }
    mask
}

/// Zeroes every grid cell outside the mask.
///
/// # Panics
/// Panics if the shapes differ.
pub fn apply_mask<T: Pixel>(grid: &mut Image<T>, mask: &Image<bool>) {
    assert_eq!(
        (grid.width(), grid.height()),
        (mask.width(), mask.height()),
        "mask shape must match grid shape"
    );
    for y in 0..grid.height() {
        for (v, &inside) in grid.row_mut(y).iter_mut().zip(mask.row(y)) {
            if !inside {
                *v = T::from_f64(0.0);
            }
        }
    }
}

/// Binary `u8` rendering: `255` inside, `0` outside.
pub fn mask_to_u8(mask: &Image<bool>) -> Image<u8> {
    mask.map(|&inside| if inside { 255 } else { 0 })
}
