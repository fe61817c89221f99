use wm_core::{BorderMode, Image, ImageView, Pixel, Point2d, Vec2d, sample_bilinear};
use wm_spline::{Centerline, WidthProfile};

use crate::frame::{CenterlinePath, SamplingFrame, target_width};
use crate::mask::{apply_mask, build_mask};
use crate::{WarpConfig, WarpError};

/// A straightened (or standardized) grid and its body mask.
///
/// Both images are `cols` wide and `rows` tall: one row per longitudinal
/// sample, head first.
#[derive(Debug, Clone, PartialEq)]
pub struct Warp<T> {
    pub image: Image<T>,
    pub mask: Image<bool>,
}

impl<T: Pixel> Warp<T> {
    /// The grid with every out-of-body cell set to zero.
    pub fn masked(&self) -> Image<T> {
        let mut out = self.image.clone();
        apply_mask(&mut out, &self.mask);
        out
    }
}

/// Source-image position of a grid cell: the row's centre point moved
/// `offset` along the unit normal.
pub(crate) fn place(center: Point2d, normal: Vec2d, offset: f64) -> Point2d {
    center + normal * offset
}

/// Fills a `frame`-shaped grid from `image`. `row_scale[i]` stretches the
/// transverse offsets of row `i` (all ones for plain straightening).
pub(crate) fn resample<T: Pixel>(
    image: &ImageView<'_, T>,
    path: &CenterlinePath<'_>,
    frame: &SamplingFrame,
    row_scale: &[f64],
    border: &BorderMode<f64>,
) -> Image<T> {
    let (rows, cols) = frame.shape();
    let mut out = Image::new_fill(cols, rows, T::default());

    for (i, (&t, &scale)) in frame.row_params().iter().zip(row_scale).enumerate() {
        let (center, normal) = path.station(t);
        let row = out.row_mut(i);
        for (j, dst) in row.iter_mut().enumerate() {
            let p = place(center, normal, frame.offset(j) * scale);
            *dst = T::from_f64(sample_bilinear(image, p.x, p.y, border));
        }
    }

    out
}

/// Samples `image` along normal cross-sections of `centerline` into a
/// `rows x cols` grid.
///
/// The grid spans `target_width(width)` across and the centerline's arc
/// length along, at the resolutions in `cfg`. Source coordinates outside the
/// image resolve through `cfg.border`.
pub fn sample<T: Pixel>(
    image: &ImageView<'_, T>,
    centerline: &Centerline,
    width: &WidthProfile,
    cfg: &WarpConfig,
) -> Result<Image<T>, WarpError> {
    let (grid, _) = sample_with_frame(image, centerline, width, cfg)?;
    Ok(grid)
}

fn sample_with_frame<T: Pixel>(
    image: &ImageView<'_, T>,
    centerline: &Centerline,
    width: &WidthProfile,
    cfg: &WarpConfig,
) -> Result<(Image<T>, SamplingFrame), WarpError> {
    if image.is_empty() {
        return Err(WarpError::EmptyImage);
    }
    let path = CenterlinePath::new(centerline, cfg)?;
    let frame = SamplingFrame::new(&path, path.length(), target_width(width, cfg)?, cfg)?;
    let ones = vec![1.0; frame.rows()];
    Ok((resample(image, &path, &frame, &ones, &cfg.border), frame))
}

/// Straightens a worm: [`sample`] plus the mask from its own width profile.
pub fn straighten<T: Pixel>(
    image: &ImageView<'_, T>,
    centerline: &Centerline,
    width: &WidthProfile,
    cfg: &WarpConfig,
) -> Result<Warp<T>, WarpError> {
    let (grid, frame) = sample_with_frame(image, centerline, width, cfg)?;
    Ok(Warp {
        image: grid,
        mask: build_mask(&frame, width),
    })
}

#[cfg(test)]
mod tests {
    use super::{place, sample, straighten};
    use crate::frame::{CenterlinePath, SamplingFrame, target_width};
    use crate::{WarpConfig, WarpError};
    use wm_core::{Image, Point2d};
    use wm_spline::{BSpline, Centerline, WidthProfile};

    fn sample_point(path: &CenterlinePath<'_>, frame: &SamplingFrame, i: usize, j: usize) -> Point2d {
        let (center, normal) = path.station(frame.row_params()[i]);
        place(center, normal, frame.offset(j))
    }

    fn horizontal() -> Centerline {
        BSpline::new(vec![0.0, 0.0, 1.0, 1.0], vec![[10.0, 20.0], [110.0, 20.0]], 1)
            .expect("valid spline")
    }

    fn s_curve() -> Centerline {
        BSpline::new(
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
            vec![[20.0, 30.0], [60.0, 0.0], [80.0, 70.0], [130.0, 40.0]],
            3,
        )
        .expect("valid spline")
    }

    fn constant(w: f64) -> WidthProfile {
        BSpline::new(vec![0.0, 0.0, 1.0, 1.0], vec![[w], [w]], 1).expect("valid spline")
    }

    fn tapering() -> WidthProfile {
        BSpline::new(vec![0.0, 0.0, 1.0, 1.0], vec![[6.3], [1.7]], 1).expect("valid spline")
    }

    fn bulging() -> WidthProfile {
        BSpline::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], vec![[0.8], [9.1], [1.3]], 2)
            .expect("valid spline")
    }

    fn ramp(width: usize, height: usize, f: impl Fn(usize, usize) -> f32) -> Image<f32> {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Image::from_vec(width, height, data).expect("valid image")
    }

    #[test]
    fn grid_width_is_twice_the_max_half_width() {
        let img = ramp(160, 120, |_, _| 0.0);
        let cfg = WarpConfig::default();
        for (w, expected) in [(constant(5.0), 10), (tapering(), 13), (bulging(), 10)] {
            let grid = sample(&img.as_view(), &s_curve(), &w, &cfg).expect("sampled");
            let max = w.sampled_max(cfg.width_probe_samples);
            assert_eq!(grid.width(), (2.0 * max).round() as usize);
            assert_eq!(grid.width(), expected);
        }

        let half_px = WarpConfig {
            transverse_step: 0.5,
            ..WarpConfig::default()
        };
        let grid = sample(&img.as_view(), &s_curve(), &tapering(), &half_px).expect("sampled");
        assert_eq!(grid.width(), 25);
    }

    #[test]
    fn straight_worm_reads_x_along_rows_and_y_across() {
        let cfg = WarpConfig::default();
        let along = ramp(128, 48, |x, _| x as f32);
        let grid = sample(&along.as_view(), &horizontal(), &constant(5.0), &cfg).expect("sampled");
        assert_eq!((grid.height(), grid.width()), (100, 10));
        for i in [0usize, 37, 99] {
            let expected = 10.0 + 100.0 * i as f32 / 99.0;
            for &v in grid.row(i) {
                assert!((v - expected).abs() < 1e-3, "row {i}: {v} vs {expected}");
            }
        }

        let across = ramp(128, 48, |_, y| y as f32);
        let grid = sample(&across.as_view(), &horizontal(), &constant(5.0), &cfg).expect("sampled");
        for (j, &v) in grid.row(50).iter().enumerate() {
            let expected = 20.0 + (j as f32 - 4.5);
            assert!((v - expected).abs() < 1e-4, "col {j}");
        }
    }

    #[test]
    fn output_keeps_source_bit_depth() {
        let data: Vec<u16> = (0..64 * 64).map(|i| (i % 64) as u16 * 1000).collect();
        let img = Image::from_vec(64, 64, data).expect("valid image");
        let c: Centerline =
            BSpline::new(vec![0.0, 0.0, 1.0, 1.0], vec![[10.0, 32.0], [50.0, 32.0]], 1)
                .expect("valid spline");
        let grid: Image<u16> = sample(&img.as_view(), &c, &constant(3.0), &WarpConfig::default())
            .expect("sampled");
        assert_eq!(grid.row(0)[0], 10_000);
        assert_eq!(grid.row(grid.height() - 1)[0], 50_000);
    }

    #[test]
    fn off_image_worm_reflects_instead_of_failing() {
        let img = ramp(16, 16, |x, y| (x + y) as f32);
        let c: Centerline =
            BSpline::new(vec![0.0, 0.0, 1.0, 1.0], vec![[-40.0, -10.0], [60.0, 30.0]], 1)
                .expect("valid spline");
        let grid = sample(&img.as_view(), &c, &constant(8.0), &WarpConfig::default())
            .expect("sampled");
        assert!(grid.data().iter().all(|v| v.is_finite() && (0.0..=30.0).contains(v)));
    }

    #[test]
    fn zero_length_centerline_is_rejected() {
        let img = ramp(16, 16, |_, _| 1.0);
        let c: Centerline =
            BSpline::new(vec![0.0, 0.0, 1.0, 1.0], vec![[4.0, 4.0], [4.0, 4.0]], 1)
                .expect("valid spline");
        assert!(matches!(
            sample(&img.as_view(), &c, &constant(2.0), &WarpConfig::default()),
            Err(WarpError::DegenerateSpline(_))
        ));

        let empty: Image<f32> = Image::from_vec(0, 0, Vec::new()).expect("valid image");
        assert_eq!(
            sample(&empty.as_view(), &horizontal(), &constant(2.0), &WarpConfig::default()),
            Err(WarpError::EmptyImage)
        );
    }

    #[test]
    fn mask_matches_sampled_normal_distance() {
        let img = ramp(160, 120, |x, y| (x * y) as f32);
        let cfg = WarpConfig::default();
        let c = s_curve();
        let path = CenterlinePath::new(&c, &cfg).expect("valid path");

        for w in [constant(5.0), tapering(), bulging()] {
            let warp = straighten(&img.as_view(), &c, &w, &cfg).expect("straightened");
            let frame = SamplingFrame::new(&path, path.length(), target_width(&w, &cfg).unwrap(), &cfg)
                .expect("valid frame");
            assert_eq!(frame.shape(), (warp.mask.height(), warp.mask.width()));

            let mut checked = 0;
            for i in 0..frame.rows() {
                let t = frame.row_params()[i];
                let (center, _) = path.station(t);
                let half = w.value(t);
                for j in 0..frame.cols() {
                    let d = sample_point(&path, &frame, i, j).distance(center);
                    if (d - half).abs() < 1e-9 {
                        continue;
                    }
                    assert_eq!(*warp.mask.get(j, i).unwrap(), d <= half, "cell ({i}, {j})");
                    checked += 1;
                }
            }
            assert!(checked > frame.rows() * frame.cols() / 2);
        }
    }

    #[test]
    fn masked_grid_is_zero_outside_the_body() {
        let img = ramp(160, 120, |_, _| 7.0);
        let cfg = WarpConfig {
            width_margin: 4.0,
            ..WarpConfig::default()
        };
        let warp = straighten(&img.as_view(), &s_curve(), &bulging(), &cfg).expect("straightened");
        let masked = warp.masked();
        for (v, &inside) in masked.data().iter().zip(warp.mask.data()) {
            assert_eq!(*v, if inside { 7.0 } else { 0.0 });
        }
        assert!(warp.mask.data().iter().any(|&m| !m));
    }
}
