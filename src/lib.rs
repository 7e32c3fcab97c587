//! Stochastic starspot emergence simulator.
//!
//! This crate generates synthetic catalogs of magnetic active regions on a
//! star, reproducing the latitude drift and cycle overlap of the solar
//! butterfly diagram. Regions are drawn day by day from a binned rate model
//! with a discrete size ladder and a recency boost that clusters large regions.

pub mod emergence;
pub mod geometry;
pub mod catalog;
pub mod analysis;
pub mod export;

pub use emergence::{EmergenceConfig, ConfigError, LatitudeMode, Simulation, SimulationSummary, simulate};
pub use catalog::{Region, RegionCatalog};
pub use analysis::{monthly_spot_counts, fit_spot_amplitude, MonthlyCounts, SpotCycleFit};
