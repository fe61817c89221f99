//! Worm records and the population-level steps built on them.
//!
//! A [`WormRecord`] pairs a centerline and a half-width profile with the
//! worm's age, parsed from per-worm JSON metadata. On top of records this
//! crate provides:
//! - cohort selection and averaging into a canonical profile
//!   ([`average_cohort`], [`canonical_profile`]),
//! - centerline and landmark exports ([`centerline_positions`],
//!   [`landmark_positions`]),
//! - batch drivers over a [`WormStore`] that skip and report failing
//!   records ([`straighten_all`], [`run_unit_worms`]).

mod averager;
mod batch;
mod error;
mod export;
mod record;

pub use averager::{
    CohortAverage, CohortConfig, CohortFilter, average_cohort, canonical_profile, select_cohort,
};
pub use batch::{
    BatchReport, SkippedRecord, UnitWormRun, WormStore, run_unit_worms, standardize_all,
    straighten_all,
};
pub use error::CohortError;
pub use export::{CENTERLINE_EXPORT_POINTS, centerline_positions, format_xy, landmark_positions};
pub use record::WormRecord;
