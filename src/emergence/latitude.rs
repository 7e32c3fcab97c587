//! Active-latitude distribution as a function of cycle phase.

use serde::{Deserialize, Serialize};

/// Lower bound on the latitude spread (degrees), keeps the Gaussian weight finite.
pub const MIN_LATITUDE_SPREAD_DEG: f64 = 0.1;

/// Fraction of the band width used as the spread of the drifting belt.
const DRIFTING_SPREAD_FRACTION: f64 = 1.0 / 7.0;

/// Policy for where regions emerge within the active band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatitudeMode {
    /// Belt migrates from `max_lat` toward `min_lat` over the cycle.
    #[default]
    Drifting,
    /// Broad band centered on the middle of [min_lat, max_lat], independent of phase.
    Uniform,
}

impl LatitudeMode {
    /// Returns the name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            LatitudeMode::Drifting => "drifting",
            LatitudeMode::Uniform => "uniform",
        }
    }
}

/// Mean and spread of active latitude (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatitudeStats {
    pub mean: f64,
    pub spread: f64,
}

/// Computes the active-latitude distribution for a cycle phase.
///
/// # Arguments
/// * `phase` - Cycle phase in [0, 1]
/// * `min_lat` - Lowest active latitude (degrees)
/// * `max_lat` - Highest active latitude (degrees)
/// * `mode` - Drifting belt or uniform band
///
/// # Returns
/// The mean latitude and a spread that is always at least [`MIN_LATITUDE_SPREAD_DEG`]
pub fn latitude_stats(phase: f64, min_lat: f64, max_lat: f64, mode: LatitudeMode) -> LatitudeStats {
    let width = max_lat - min_lat;
    let (mean, spread) = match mode {
        LatitudeMode::Drifting => {
            // Exponential interpolation: max_lat at phase 0, min_lat at phase 1.
            let mean = max_lat * (min_lat / max_lat).powf(phase);
            (mean, width * DRIFTING_SPREAD_FRACTION)
        }
        LatitudeMode::Uniform => (0.5 * (min_lat + max_lat), width),
    };

    LatitudeStats {
        mean,
        spread: spread.max(MIN_LATITUDE_SPREAD_DEG),
    }
}
