//! Stochastic emergence engine.
//!
//! This module implements the per-day emergence process:
//! - Overlapping activity cycles with a sin² rate envelope
//! - Drifting or uniform active-latitude belts
//! - Longitude × latitude × hemisphere binning with a discrete size ladder
//! - Recency-based clustering of large regions
//! - Nested inverse-CDF sampling from a single uniform draw per row

mod config;
mod bins;
mod cycle;
mod latitude;
mod recency;
mod sampler;

pub use config::{
    EmergenceConfig, ConfigError, BinConfig, SizeConfig, CorrelationConfig, DAYS_PER_YEAR,
};
pub use bins::{BinGeometry, SizeLadder, Cell, Hemisphere, LOCATE_TOLERANCE_DEG};
pub use cycle::{CycleTiming, ActiveCycle, emergence_envelope};
pub use latitude::{LatitudeMode, LatitudeStats, latitude_stats, MIN_LATITUDE_SPREAD_DEG};
pub use recency::RecencyTracker;
pub use sampler::{
    Simulation, SimulationSummary, LadderPick, resolve_ladder, latitude_rates, simulate,
};
