use crate::border::{BorderMode, map_index};
use crate::image::ImageView;
use crate::pixel::Pixel;

/// Bilinear interpolation at pixel-centre coordinates `(x, y)`.
///
/// Neighbours outside the image are resolved through `border`, so any finite
/// coordinate yields a value. Non-finite coordinates sample as the border
/// constant (or `0.0` for the mirroring modes).
///
/// # Panics
/// Panics on an empty image with a non-constant border.
pub fn sample_bilinear<T: Pixel>(
    img: &ImageView<'_, T>,
    x: f64,
    y: f64,
    border: &BorderMode<f64>,
) -> f64 {
    if img.is_empty() {
        if let BorderMode::Constant(v) = border {
            return *v;
        }
        panic!("cannot sample an empty image with non-constant border");
    }

    if !x.is_finite() || !y.is_finite() {
        return match border {
            BorderMode::Constant(v) => *v,
            _ => 0.0,
        };
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let dx = x - x0;
    let dy = y - y0;
    let (x0, y0) = (x0 as isize, y0 as isize);

    let p00 = sample_at(img, x0, y0, border);
    let p10 = sample_at(img, x0 + 1, y0, border);
    let p01 = sample_at(img, x0, y0 + 1, border);
    let p11 = sample_at(img, x0 + 1, y0 + 1, border);

    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;
    top * (1.0 - dy) + bottom * dy
}

fn sample_at<T: Pixel>(img: &ImageView<'_, T>, x: isize, y: isize, border: &BorderMode<f64>) -> f64 {
    let xi = map_index(x, img.width(), border);
    let yi = map_index(y, img.height(), border);
    match (xi, yi) {
        // SAFETY: `map_index` returns indices in `[0, len)` for non-empty axes.
        (Some(xi), Some(yi)) => unsafe { img.get_unchecked(xi, yi).to_f64() },
        _ => match border {
            BorderMode::Constant(c) => *c,
            _ => 0.0,
        },
    }
}
