use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use wm_core::{Image, Polyline2d};
use wm_spline::{Centerline, WidthProfile, outline};

/// Outline vertices used when rasterizing a body mask.
pub const OUTLINE_POINTS: usize = 400;

/// Fills a closed polygon into a `width x height` mask, `255` inside and on
/// the boundary, `0` outside.
///
/// Vertices are rounded to the pixel grid. Repeated vertices (including a
/// closing vertex equal to the first) are dropped, and polygons that collapse
/// below three distinct vertices leave the mask empty.
pub fn fill_polygon(width: usize, height: usize, polygon: &Polyline2d) -> Image<u8> {
    let mut canvas = GrayImage::new(width as u32, height as u32);

    let mut pts: Vec<Point<i32>> = Vec::with_capacity(polygon.points.len());
    for p in &polygon.points {
        if !p.x.is_finite() || !p.y.is_finite() {
            continue;
        }
        let q = Point::new(p.x.round() as i32, p.y.round() as i32);
        if pts.last() != Some(&q) {
            pts.push(q);
        }
    }
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }

    if pts.len() >= 3 && width > 0 && height > 0 {
        draw_polygon_mut(&mut canvas, &pts, Luma([255u8]));
    }

    // GrayImage is tightly packed row-major, the same layout as Image<u8>.
    Image::from_vec(width, height, canvas.into_raw())
        .unwrap_or_else(|_| Image::new_fill(width, height, 0))
}

/// Rasterizes the body outline of a worm into a `width x height` mask in
/// source-image coordinates.
pub fn render_body_mask(
    centerline: &Centerline,
    half_width: &WidthProfile,
    width: usize,
    height: usize,
) -> Image<u8> {
    let polygon = outline(centerline, half_width, OUTLINE_POINTS).polygon();
    fill_polygon(width, height, &polygon)
}
