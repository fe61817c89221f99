use serde::Deserialize;
use wm_spline::{BSpline, Centerline, WidthProfile};

use crate::CohortError;

/// Spline parameters as written by the annotation tools: either
/// `{"t": [...], "c": [...], "k": 3}` or a `[t, c, k]` triple.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tck<C> {
    Named { t: Vec<f64>, c: Vec<C>, k: usize },
    Triple(Vec<f64>, Vec<C>, usize),
}

impl<C> Tck<C> {
    fn into_parts(self) -> (Vec<f64>, Vec<C>, usize) {
        match self {
            Self::Named { t, c, k } | Self::Triple(t, c, k) => (t, c, k),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    spine_tck: Option<Tck<[f64; 2]>>,
    width_tck: Option<Tck<f64>>,
    age_days: Option<f64>,
    vulva_t: Option<f64>,
}

/// One annotated worm. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct WormRecord {
    name: String,
    centerline: Centerline,
    width: WidthProfile,
    age_days: f64,
    vulva_t: Option<f64>,
}

impl WormRecord {
    /// Builds a record, checking that both splines share one parameter
    /// domain and that the landmark lies on it.
    pub fn new(
        name: impl Into<String>,
        centerline: Centerline,
        width: WidthProfile,
        age_days: f64,
        vulva_t: Option<f64>,
    ) -> Result<Self, CohortError> {
        if !age_days.is_finite() {
            return Err(CohortError::InvalidMetadataField("age_days"));
        }

        let (a0, a1) = centerline.domain();
        let (b0, b1) = width.domain();
        let tol = 1e-9 * (a1 - a0).abs().max(1.0);
        if (a0 - b0).abs() > tol || (a1 - b1).abs() > tol {
            return Err(CohortError::DomainMismatch {
                centerline: (a0, a1),
                width: (b0, b1),
            });
        }

        if let Some(t) = vulva_t
            && !(t.is_finite() && (a0..=a1).contains(&t))
        {
            return Err(CohortError::InvalidMetadataField("vulva_t"));
        }

        Ok(Self {
            name: name.into(),
            centerline,
            width,
            age_days,
            vulva_t,
        })
    }

    /// Parses a JSON metadata document. Required keys: `spine_tck`,
    /// `width_tck`, `age_days`; optional: `vulva_t`. Other keys are ignored.
    pub fn from_json(name: impl Into<String>, bytes: &[u8]) -> Result<Self, CohortError> {
        let raw: RawMetadata =
            serde_json::from_slice(bytes).map_err(|e| CohortError::Metadata(e.to_string()))?;

        let (t, c, k) = raw
            .spine_tck
            .ok_or(CohortError::MissingMetadataField("spine_tck"))?
            .into_parts();
        let centerline = BSpline::new(t, c, k)?;

        let (t, c, k) = raw
            .width_tck
            .ok_or(CohortError::MissingMetadataField("width_tck"))?
            .into_parts();
        let width = BSpline::new(t, c.into_iter().map(|w| [w]).collect(), k)?;

        let age_days = raw
            .age_days
            .ok_or(CohortError::MissingMetadataField("age_days"))?;

        Self::new(name, centerline, width, age_days, raw.vulva_t)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn centerline(&self) -> &Centerline {
        &self.centerline
    }

    pub fn width(&self) -> &WidthProfile {
        &self.width
    }

    pub fn age_days(&self) -> f64 {
        self.age_days
    }

    pub fn vulva_t(&self) -> Option<f64> {
        self.vulva_t
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::WormRecord;
    use crate::CohortError;
    use wm_spline::{BSpline, SplineError};

    /// Straight horizontal worm `length` pixels long with constant
    /// half-width `half_width`.
    pub(crate) fn straight_worm(name: &str, age: f64, length: f64, half_width: f64) -> WormRecord {
        let c = BSpline::new(
            vec![0.0, 0.0, 1.0, 1.0],
            vec![[20.0, 40.0], [20.0 + length, 40.0]],
            1,
        )
        .expect("valid spline");
        let w = BSpline::new(vec![0.0, 0.0, 1.0, 1.0], vec![[half_width], [half_width]], 1)
            .expect("valid spline");
        WormRecord::new(name, c, w, age, Some(0.5)).expect("valid record")
    }

    const NAMED: &str = r#"{
        "spine_tck": {"t": [0, 0, 0, 1, 1, 1], "c": [[0, 0], [50, 20], [100, 0]], "k": 2},
        "width_tck": {"t": [0, 0, 1, 1], "c": [3, 5, 0, 0], "k": 1},
        "age_days": 4.5,
        "vulva_t": 0.45,
        "notes": "ignored"
    }"#;

    #[test]
    fn parses_named_tck() {
        let r = WormRecord::from_json("w01", NAMED.as_bytes()).expect("valid record");
        assert_eq!(r.name(), "w01");
        assert_eq!(r.age_days(), 4.5);
        assert_eq!(r.vulva_t(), Some(0.45));
        assert_eq!(r.centerline().degree(), 2);
        assert!((r.width().value(0.5) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn parses_triple_tck_without_landmark() {
        let doc = r#"{
            "spine_tck": [[0, 0, 1, 1], [[0, 0], [10, 0]], 1],
            "width_tck": [[0, 0, 1, 1], [2, 2], 1],
            "age_days": 6
        }"#;
        let r = WormRecord::from_json("w02", doc.as_bytes()).expect("valid record");
        assert_eq!(r.vulva_t(), None);
        assert_eq!(r.centerline().point(1.0).x, 10.0);
    }

    #[test]
    fn missing_fields_fail_at_construction() {
        let no_spine = r#"{"width_tck": [[0, 0, 1, 1], [2, 2], 1], "age_days": 6}"#;
        assert_eq!(
            WormRecord::from_json("x", no_spine.as_bytes()),
            Err(CohortError::MissingMetadataField("spine_tck"))
        );

        let no_width = r#"{"spine_tck": [[0, 0, 1, 1], [[0, 0], [10, 0]], 1], "age_days": 6}"#;
        assert_eq!(
            WormRecord::from_json("x", no_width.as_bytes()),
            Err(CohortError::MissingMetadataField("width_tck"))
        );

        let null_age = r#"{
            "spine_tck": [[0, 0, 1, 1], [[0, 0], [10, 0]], 1],
            "width_tck": [[0, 0, 1, 1], [2, 2], 1],
            "age_days": null
        }"#;
        assert_eq!(
            WormRecord::from_json("x", null_age.as_bytes()),
            Err(CohortError::MissingMetadataField("age_days"))
        );

        assert!(matches!(
            WormRecord::from_json("x", b"not json"),
            Err(CohortError::Metadata(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_geometry() {
        let mismatch = r#"{
            "spine_tck": [[0, 0, 1, 1], [[0, 0], [10, 0]], 1],
            "width_tck": [[0, 0, 2, 2], [2, 2], 1],
            "age_days": 6
        }"#;
        assert!(matches!(
            WormRecord::from_json("x", mismatch.as_bytes()),
            Err(CohortError::DomainMismatch { .. })
        ));

        let decreasing = r#"{
            "spine_tck": [[0, 1, 0.5, 1], [[0, 0], [10, 0]], 1],
            "width_tck": [[0, 0, 1, 1], [2, 2], 1],
            "age_days": 6
        }"#;
        assert_eq!(
            WormRecord::from_json("x", decreasing.as_bytes()),
            Err(CohortError::Spline(SplineError::NonMonotonicKnots))
        );

        let off_body = r#"{
            "spine_tck": [[0, 0, 1, 1], [[0, 0], [10, 0]], 1],
            "width_tck": [[0, 0, 1, 1], [2, 2], 1],
            "age_days": 6,
            "vulva_t": 1.5
        }"#;
        assert_eq!(
            WormRecord::from_json("x", off_body.as_bytes()),
            Err(CohortError::InvalidMetadataField("vulva_t"))
        );
    }
}
