//! Post-hoc statistics over a region catalog.
//!
//! Counts regions per month and fits the cycle amplitude, used to normalize the
//! activity rate against the solar record.

mod monthly;
mod fit;

pub use monthly::{monthly_spot_counts, MonthlyCounts, DAYS_PER_MONTH, MONTHS_PER_YEAR};
pub use fit::{fit_spot_amplitude, SpotCycleFit, AnalysisError};
