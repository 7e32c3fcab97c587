//! Monthly aggregation of emergence counts.

use crate::catalog::RegionCatalog;
use crate::emergence::DAYS_PER_YEAR;

/// Months per simulated year.
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Length of a simulated month in days.
pub const DAYS_PER_MONTH: f64 = DAYS_PER_YEAR / MONTHS_PER_YEAR;

const MONTHS_PER_YEAR_INT: u64 = 12;
const DAYS_PER_YEAR_INT: u64 = 365;

/// Number of regions emerging in each month of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCounts {
    /// Month centers in years since the start of the run.
    pub time_years: Vec<f64>,
    /// Regions per month.
    pub counts: Vec<f64>,
}

impl MonthlyCounts {
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Largest monthly count, 0 for an empty series.
    pub fn peak(&self) -> f64 {
        self.counts.iter().copied().fold(0.0, f64::max)
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }
}

/// Buckets the catalog into months covering `ndays` days.
///
/// The final month may be partial. Regions dated on or after `ndays` are ignored.
pub fn monthly_spot_counts(catalog: &RegionCatalog, ndays: u32) -> MonthlyCounts {
    // Integer month arithmetic avoids rounding a whole number of years up a month.
    let months = (u64::from(ndays) * MONTHS_PER_YEAR_INT).div_ceil(DAYS_PER_YEAR_INT) as usize;
    let mut counts = vec![0.0; months];

    for region in catalog {
        if region.day >= ndays {
            continue;
        }
        let month = (u64::from(region.day) * MONTHS_PER_YEAR_INT / DAYS_PER_YEAR_INT) as usize;
        counts[month.min(months - 1)] += 1.0;
    }

    let time_years = (0..months)
        .map(|m| (m as f64 + 0.5) / MONTHS_PER_YEAR)
        .collect();

    MonthlyCounts { time_years, counts }
}
