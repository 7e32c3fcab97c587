//! Configuration for the emergence engine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::latitude::LatitudeMode;

/// Days per simulated year. Cycle lengths given in years are converted with this.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Errors raised while loading or validating an [`EmergenceConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Activity rate must be positive, got {0}")]
    NonPositiveActivityRate(f64),
    #[error("Invalid latitude band: min ({0}) must be below max ({1})")]
    InvalidLatitudeBand(f64, f64),
    #[error("Maximum latitude {0} exceeds 90 degrees")]
    LatitudeOutOfRange(f64),
    #[error("Minimum latitude must be non-negative, got {0}")]
    NegativeMinLatitude(f64),
    #[error("Drifting latitude mode requires a positive minimum latitude, got {0}")]
    DriftingRequiresPositiveMinLatitude(f64),
    #[error("Cycle length must be positive, got {0} years")]
    NonPositiveCycleLength(f64),
    #[error("Cycle overlap must be non-negative, got {0} years")]
    NegativeCycleOverlap(f64),
    #[error("Bin counts must be non-zero (nlon={0}, nlat={1})")]
    EmptyBins(usize, usize),
    #[error("Size ladder needs at least one class")]
    EmptySizeLadder,
    #[error("Invalid size ladder: delt={0}, amax={1}")]
    InvalidSizeLadder(f64, f64),
    #[error("Invalid correlation window: tau1 ({0}) must be below tau2 ({1})")]
    InvalidCorrelationWindow(u32, u32),
    #[error("Correlation probability must be non-negative, got {0}")]
    NegativeCorrelationProbability(f64),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Partition of the active band into longitude and latitude bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinConfig {
    /// Number of longitude bins over [0°, 360°).
    pub nlon: usize,
    /// Number of latitude bins over [min_lat, max_lat].
    pub nlat: usize,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self { nlon: 36, nlat: 16 }
    }
}

/// Discrete bipole size classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeConfig {
    /// Number of size classes (class 0 is the largest).
    pub nbin: usize,
    /// Step in ln(area) between consecutive classes.
    pub delt: f64,
    /// Area of the largest bipoles (deg²).
    pub amax: f64,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            nbin: 5,
            delt: 0.5,
            amax: 100.0,
        }
    }
}

/// Elevated-probability window following a large emergence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// First day (inclusive) of the window.
    pub tau1: u32,
    /// Last day (exclusive) of the window; also the "inactive" recency value.
    pub tau2: u32,
    /// Total probability of a correlated emergence over the window.
    pub probability: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            tau1: 5,
            tau2: 15,
            probability: 0.001,
        }
    }
}

/// Configuration parameters for the emergence simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergenceConfig {
    /// Activity rate relative to the Sun (1.0 = solar).
    pub activity_rate: f64,
    /// Lowest active latitude (degrees, per hemisphere).
    pub min_lat_deg: f64,
    /// Highest active latitude (degrees, per hemisphere).
    pub max_lat_deg: f64,
    /// Spacing between consecutive cycle starts (years).
    pub cycle_length_years: f64,
    /// Extra duration each cycle stays active past the next start (years).
    pub cycle_overlap_years: f64,
    /// Number of simulated days.
    pub ndays: u32,
    /// Active-latitude policy.
    pub latitude_mode: LatitudeMode,
    /// Random seed for reproducible generation.
    pub seed: u64,

    pub bins: BinConfig,
    pub sizes: SizeConfig,
    pub correlation: CorrelationConfig,
}

impl Default for EmergenceConfig {
    fn default() -> Self {
        Self {
            activity_rate: 1.0,
            min_lat_deg: 5.0,
            max_lat_deg: 35.0,
            cycle_length_years: 3.0,
            cycle_overlap_years: 1.0,
            ndays: 3600,
            latitude_mode: LatitudeMode::Drifting,
            seed: 88,
            bins: BinConfig::default(),
            sizes: SizeConfig::default(),
            correlation: CorrelationConfig::default(),
        }
    }
}

impl EmergenceConfig {
    /// Creates the default configuration with a different seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Sun-like star: 11-year cycles with one year of overlap, simulated for a century.
    pub fn solar_like(seed: u64) -> Self {
        Self {
            activity_rate: 1.0,
            min_lat_deg: 7.0,
            max_lat_deg: 35.0,
            cycle_length_years: 11.0,
            cycle_overlap_years: 1.0,
            ndays: 365 * 100,
            seed,
            ..Default::default()
        }
    }

    /// Spacing between cycle starts in days.
    pub fn cycle_length_days(&self) -> f64 {
        DAYS_PER_YEAR * self.cycle_length_years
    }

    /// Duration of a single cycle's active window in days.
    pub fn active_window_days(&self) -> f64 {
        DAYS_PER_YEAR * (self.cycle_length_years + self.cycle_overlap_years)
    }

    /// Checks every parameter the engine divides by or takes roots of.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.activity_rate > 0.0) {
            return Err(ConfigError::NonPositiveActivityRate(self.activity_rate));
        }
        if !(self.min_lat_deg < self.max_lat_deg) {
            return Err(ConfigError::InvalidLatitudeBand(self.min_lat_deg, self.max_lat_deg));
        }
        if self.max_lat_deg > 90.0 {
            return Err(ConfigError::LatitudeOutOfRange(self.max_lat_deg));
        }
        if self.min_lat_deg < 0.0 {
            return Err(ConfigError::NegativeMinLatitude(self.min_lat_deg));
        }
        if self.latitude_mode == LatitudeMode::Drifting && self.min_lat_deg <= 0.0 {
            return Err(ConfigError::DriftingRequiresPositiveMinLatitude(self.min_lat_deg));
        }
        if !(self.cycle_length_years > 0.0) {
            return Err(ConfigError::NonPositiveCycleLength(self.cycle_length_years));
        }
        if !(self.cycle_overlap_years >= 0.0) {
            return Err(ConfigError::NegativeCycleOverlap(self.cycle_overlap_years));
        }
        if self.bins.nlon == 0 || self.bins.nlat == 0 {
            return Err(ConfigError::EmptyBins(self.bins.nlon, self.bins.nlat));
        }
        if self.sizes.nbin == 0 {
            return Err(ConfigError::EmptySizeLadder);
        }
        if !self.sizes.delt.is_finite() || !(self.sizes.amax > 0.0) {
            return Err(ConfigError::InvalidSizeLadder(self.sizes.delt, self.sizes.amax));
        }
        if self.correlation.tau1 >= self.correlation.tau2 {
            return Err(ConfigError::InvalidCorrelationWindow(
                self.correlation.tau1,
                self.correlation.tau2,
            ));
        }
        if !(self.correlation.probability >= 0.0) {
            return Err(ConfigError::NegativeCorrelationProbability(
                self.correlation.probability,
            ));
        }
        Ok(())
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// Missing fields fall back to [`EmergenceConfig::default`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file and validates it.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file without validating it.
    ///
    /// Use this when further overrides are applied before the configuration
    /// is validated.
    pub fn read_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
