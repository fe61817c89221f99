use wm_spline::{ArcLengthTable, DEFAULT_SUBDIVISIONS, FitConfig, fit_profile};
use tracing::warn;
use wm_warp::{CanonicalProfile, MIN_ARC_LENGTH};

use crate::{CohortError, WormRecord};

/// Age window in days, exclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohortFilter {
    pub age_min: f64,
    pub age_max: f64,
}

impl Default for CohortFilter {
    fn default() -> Self {
        Self {
            age_min: 3.0,
            age_max: 8.0,
        }
    }
}

impl CohortFilter {
    pub fn admits(&self, age_days: f64) -> bool {
        age_days > self.age_min && age_days < self.age_max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CohortConfig {
    pub filter: CohortFilter,
    /// Width samples per worm, evenly spaced in parameter.
    pub width_samples: usize,
    /// Quadrature sub-steps per knot span for centerline lengths.
    pub arc_subdivisions: usize,
    /// Fit of the averaged widths back into a spline over `[0, 1]`.
    pub fit: FitConfig,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            filter: CohortFilter::default(),
            width_samples: 100,
            arc_subdivisions: DEFAULT_SUBDIVISIONS,
            fit: FitConfig::default(),
        }
    }
}

/// Column-wise mean width samples and mean centerline length of a cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortAverage {
    pub width_samples: Vec<f64>,
    pub length: f64,
    pub members: Vec<String>,
}

impl CohortAverage {
    /// Fits the mean widths at `u = linspace(0, 1, n)` into the canonical
    /// width profile.
    pub fn to_profile(&self, fit: &FitConfig) -> Result<CanonicalProfile, CohortError> {
        let n = self.width_samples.len();
        let xs: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
        let width = fit_profile(&xs, &self.width_samples, fit)?;
        Ok(CanonicalProfile::new(width, self.length)?)
    }
}

/// Records whose age lies strictly inside the filter window, in input order.
pub fn select_cohort<'a>(records: &'a [WormRecord], filter: &CohortFilter) -> Vec<&'a WormRecord> {
    records
        .iter()
        .filter(|r| filter.admits(r.age_days()))
        .collect()
}

/// Averages width profiles and centerline lengths over the cohort.
///
/// Members whose centerline has no usable arc length are logged and left
/// out of both the means and `members`. Fails with `EmptyCohort` when no
/// usable record passes the filter and with `NonFiniteProfile` if any mean
/// is NaN or infinite.
pub fn average_cohort(
    records: &[WormRecord],
    cfg: &CohortConfig,
) -> Result<CohortAverage, CohortError> {
    if cfg.width_samples < 2 {
        return Err(CohortError::InvalidConfig("width_samples must be at least 2"));
    }

    let mut width_sums = vec![0.0; cfg.width_samples];
    let mut length_sum = 0.0;
    let mut members = Vec::new();
    for record in select_cohort(records, &cfg.filter) {
        let length = ArcLengthTable::new(record.centerline(), cfg.arc_subdivisions).total();
        if !(length.is_finite() && length > MIN_ARC_LENGTH) {
            warn!(worm = record.name(), length, "skipping cohort member with degenerate centerline");
            continue;
        }
        for (sum, [w]) in width_sums
            .iter_mut()
            .zip(record.width().interpolate(cfg.width_samples))
        {
            *sum += w;
        }
        length_sum += length;
        members.push(record.name().to_owned());
    }

    if members.is_empty() {
        return Err(CohortError::EmptyCohort {
            age_min: cfg.filter.age_min,
            age_max: cfg.filter.age_max,
        });
    }

    let count = members.len() as f64;
    let width_samples: Vec<f64> = width_sums.into_iter().map(|s| s / count).collect();
    let length = length_sum / count;
    if !length.is_finite() || width_samples.iter().any(|w| !w.is_finite()) {
        return Err(CohortError::NonFiniteProfile);
    }

    Ok(CohortAverage {
        width_samples,
        length,
        members,
    })
}

/// [`average_cohort`] followed by the spline fit.
pub fn canonical_profile(
    records: &[WormRecord],
    cfg: &CohortConfig,
) -> Result<(CanonicalProfile, CohortAverage), CohortError> {
    let average = average_cohort(records, cfg)?;
    let profile = average.to_profile(&cfg.fit)?;
    Ok((profile, average))
}
