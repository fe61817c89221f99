use wm_core::Point2d;

use crate::{CohortError, WormRecord};

/// Points written to a centerline export.
pub const CENTERLINE_EXPORT_POINTS: usize = 50;

/// Centerline positions at `n` parameters evenly spaced over the domain.
pub fn centerline_positions(record: &WormRecord, n: usize) -> Vec<Point2d> {
    let c = record.centerline();
    c.points(&c.linspace(n))
}

/// Head, vulva and tail positions, in that order.
pub fn landmark_positions(record: &WormRecord) -> Result<[Point2d; 3], CohortError> {
    let vulva = record
        .vulva_t()
        .ok_or(CohortError::MissingMetadataField("vulva_t"))?;
    let (head, tail) = record.centerline().domain();
    let c = record.centerline();
    Ok([c.point(head), c.point(vulva), c.point(tail)])
}

/// One `x<TAB>y` line per point.
pub fn format_xy(points: &[Point2d]) -> String {
    points
        .iter()
        .map(|p| format!("{}\t{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{CENTERLINE_EXPORT_POINTS, centerline_positions, format_xy, landmark_positions};
    use crate::CohortError;
    use crate::WormRecord;
    use crate::record::tests::straight_worm;
    use wm_core::Point2d;

    #[test]
    fn centerline_export_spans_head_to_tail() {
        let r = straight_worm("w", 5.0, 98.0, 4.0);
        let pts = centerline_positions(&r, CENTERLINE_EXPORT_POINTS);
        assert_eq!(pts.len(), 50);
        assert_eq!(pts[0], Point2d::new(20.0, 40.0));
        assert!((pts[49].x - 118.0).abs() < 1e-12);
        assert!((pts[1].x - 22.0).abs() < 1e-12);
    }

    #[test]
    fn landmarks_follow_vulva_parameter() {
        let r = straight_worm("w", 5.0, 100.0, 4.0);
        let [head, vulva, tail] = landmark_positions(&r).expect("has vulva");
        assert_eq!(head, Point2d::new(20.0, 40.0));
        assert!((vulva.x - 70.0).abs() < 1e-12);
        assert!((tail.x - 120.0).abs() < 1e-12);

        let no_vulva = WormRecord::new(
            "n",
            r.centerline().clone(),
            r.width().clone(),
            5.0,
            None,
        )
        .expect("valid record");
        assert_eq!(
            landmark_positions(&no_vulva),
            Err(CohortError::MissingMetadataField("vulva_t"))
        );
    }

    #[test]
    fn xy_is_tab_separated() {
        let text = format_xy(&[Point2d::new(1.5, 2.0), Point2d::new(-3.0, 4.25)]);
        assert_eq!(text, "1.5\t2\n-3\t4.25");
        assert_eq!(format_xy(&[]), "");
    }
}
