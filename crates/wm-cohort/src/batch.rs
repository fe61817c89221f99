use core::fmt;

use tracing::{debug, info, warn};
use wm_core::{Image, Pixel};
use wm_warp::{CanonicalProfile, Warp, WarpConfig, WarpError, standardize, straighten};

use crate::averager::{CohortAverage, CohortConfig, canonical_profile, select_cohort};
use crate::{CohortError, WormRecord};

/// Image source and warp sink for a batch run.
pub trait WormStore {
    type Pixel: Pixel;
    type Error: fmt::Display;

    fn load_image(&mut self, record: &WormRecord) -> Result<Image<Self::Pixel>, Self::Error>;

    /// `source` is the image the warp was sampled from.
    fn store_warp(
        &mut self,
        record: &WormRecord,
        source: &Image<Self::Pixel>,
        warp: &Warp<Self::Pixel>,
    ) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub name: String,
    pub reason: String,
}

/// Outcome of a batch: names written, in input order, and records skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub written: Vec<String>,
    pub skipped: Vec<SkippedRecord>,
}

impl BatchReport {
    fn skip(&mut self, record: &WormRecord, reason: String) {
        warn!(worm = record.name(), %reason, "skipping worm");
        self.skipped.push(SkippedRecord {
            name: record.name().to_owned(),
            reason,
        });
    }
}

fn warp_each<'r, S: WormStore>(
    records: impl IntoIterator<Item = &'r WormRecord>,
    store: &mut S,
    mut warp: impl FnMut(&Image<S::Pixel>, &WormRecord) -> Result<Warp<S::Pixel>, WarpError>,
) -> BatchReport {
    let mut report = BatchReport::default();
    for record in records {
        let image = match store.load_image(record) {
            Ok(image) => image,
            Err(err) => {
                report.skip(record, format!("image: {err}"));
                continue;
            }
        };
        let result = match warp(&image, record) {
            Ok(result) => result,
            Err(err) => {
                report.skip(record, err.to_string());
                continue;
            }
        };
        if let Err(err) = store.store_warp(record, &image, &result) {
            report.skip(record, format!("write: {err}"));
            continue;
        }
        debug!(
            worm = record.name(),
            rows = result.image.height(),
            cols = result.image.width(),
            "warp written"
        );
        report.written.push(record.name().to_owned());
    }
    report
}

/// Straightens every record. A record whose image cannot be loaded, whose
/// geometry is degenerate or whose output cannot be written is skipped and
/// reported; the others still run.
pub fn straighten_all<S: WormStore>(
    records: &[WormRecord],
    store: &mut S,
    cfg: &WarpConfig,
) -> BatchReport {
    info!(worms = records.len(), "straightening");
    let report = warp_each(records, store, |image, record| {
        straighten(&image.as_view(), record.centerline(), record.width(), cfg)
    });
    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "straightening finished"
    );
    report
}

/// Warps every given record onto `canonical`, with per-record failures
/// handled as in [`straighten_all`].
pub fn standardize_all<'r, S: WormStore>(
    records: impl IntoIterator<Item = &'r WormRecord>,
    canonical: &CanonicalProfile,
    store: &mut S,
    cfg: &WarpConfig,
) -> BatchReport {
    let report = warp_each(records, store, |image, record| {
        standardize(&image.as_view(), record.centerline(), record.width(), canonical, cfg)
    });
    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "standardization finished"
    );
    report
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitWormRun {
    pub profile: CanonicalProfile,
    pub average: CohortAverage,
    pub report: BatchReport,
}

/// Averages the cohort, then standardizes each cohort member onto the
/// average. The average is complete before any warp starts; an empty cohort
/// stops the run before anything is written.
pub fn run_unit_worms<S: WormStore>(
    records: &[WormRecord],
    store: &mut S,
    cohort: &CohortConfig,
    cfg: &WarpConfig,
) -> Result<UnitWormRun, CohortError> {
    let (profile, average) = canonical_profile(records, cohort)?;
    info!(
        members = average.members.len(),
        length = average.length,
        "cohort averaged"
    );

    let members = select_cohort(records, &cohort.filter);
    let report = standardize_all(members, &profile, store, cfg);
    Ok(UnitWormRun {
        profile,
        average,
        report,
    })
}
