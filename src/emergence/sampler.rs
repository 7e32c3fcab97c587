//! Day-by-day stochastic emergence of active regions.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::catalog::{Region, RegionCatalog};
use crate::geometry::{to_region, SampledEmergence};

use super::bins::{BinGeometry, Hemisphere, SizeLadder};
use super::config::{ConfigError, EmergenceConfig};
use super::cycle::{emergence_envelope, ActiveCycle, CycleTiming};
use super::latitude::{latitude_stats, LatitudeStats};
use super::recency::RecencyTracker;

/// Size class and longitude bin selected by one uniform draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderPick {
    pub size_class: usize,
    pub lon_bin: usize,
}

/// Resolves a single uniform draw `x` against the nested (size class, longitude) ladder.
///
/// The cursor first climbs `rtot·fact[0], rtot·fact[1], …` until it reaches `x`,
/// selecting the size class. It then rewinds to that class's lower boundary and
/// climbs again in steps of `r0[lon]·fact[class]` to select the longitude bin.
/// Both walks reuse the same `x`. If rounding leaves `x` beyond the end of either
/// ladder, the last class or bin is chosen.
///
/// `r0` holds the per-longitude rates of one (latitude, hemisphere) row and
/// `rtot` their sum. Both `r0` and `fact` must be non-empty.
pub fn resolve_ladder(x: f64, r0: &[f64], rtot: f64, fact: &[f64]) -> LadderPick {
    debug_assert!(!r0.is_empty() && !fact.is_empty());

    let last_class = fact.len() - 1;
    let mut size_class = 0;
    let mut sumb = rtot * fact[0];
    while x > sumb && size_class < last_class {
        size_class += 1;
        sumb += rtot * fact[size_class];
    }

    let weight = fact[size_class];
    let last_lon = r0.len() - 1;
    let mut lon_bin = 0;
    sumb += (r0[0] - rtot) * weight;
    while x > sumb && lon_bin < last_lon {
        lon_bin += 1;
        sumb += r0[lon_bin] * weight;
    }

    LadderPick { size_class, lon_bin }
}

/// Uncorrelated emergence rate per (latitude bin, longitude bin, hemisphere) cell.
///
/// Distributes `total_rate` over latitude bins with Gaussian weights centered on
/// the active latitude, normalized so the sum over every cell equals `total_rate`.
pub fn latitude_rates(total_rate: f64, stats: LatitudeStats, geometry: &BinGeometry) -> Vec<f64> {
    let weights: Vec<f64> = (0..geometry.nlat)
        .map(|j| {
            let z = (geometry.lat_center(j) - stats.mean) / stats.spread;
            (-z * z).exp()
        })
        .collect();
    let weight_sum: f64 = weights.iter().sum();

    if !(weight_sum > 0.0) {
        return vec![0.0; geometry.nlat];
    }

    let norm = weight_sum * geometry.nlon as f64 * 2.0;
    weights.into_iter().map(|w| total_rate * w / norm).collect()
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    /// Days simulated so far.
    pub days: u32,
    /// Regions appended to the catalog.
    pub regions: usize,
    /// Regions of size class 0.
    pub large_regions: usize,
    /// Sum over days of the number of active cycles.
    pub active_cycle_days: usize,
}

/// Owns all mutable simulation state: the random source, recency values, and catalog.
pub struct Simulation {
    config: EmergenceConfig,
    geometry: BinGeometry,
    ladder: SizeLadder,
    timing: CycleTiming,
    recency: RecencyTracker,
    catalog: RegionCatalog,
    rng: ChaCha8Rng,
    next_day: u32,
    latest_cycle: Option<i64>,
    summary: SimulationSummary,
}

impl Simulation {
    /// Validates the configuration and prepares a simulation at day 0.
    pub fn new(config: EmergenceConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let geometry = BinGeometry::from_config(config.min_lat_deg, config.max_lat_deg, &config.bins);
        let ladder = SizeLadder::from_config(&config.sizes);
        let timing = CycleTiming::from_config(&config);
        let recency = RecencyTracker::for_geometry(&geometry, &config.correlation);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            geometry,
            ladder,
            timing,
            recency,
            catalog: RegionCatalog::new(),
            rng,
            next_day: 0,
            latest_cycle: None,
            summary: SimulationSummary::default(),
        })
    }

    pub fn config(&self) -> &EmergenceConfig {
        &self.config
    }

    pub fn geometry(&self) -> &BinGeometry {
        &self.geometry
    }

    pub fn ladder(&self) -> &SizeLadder {
        &self.ladder
    }

    pub fn timing(&self) -> &CycleTiming {
        &self.timing
    }

    pub fn recency(&self) -> &RecencyTracker {
        &self.recency
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn summary(&self) -> SimulationSummary {
        self.summary
    }

    /// Next day to be simulated.
    pub fn next_day(&self) -> u32 {
        self.next_day
    }

    /// True once every configured day has been simulated.
    pub fn is_finished(&self) -> bool {
        self.next_day >= self.config.ndays
    }

    /// Consumes the simulation and returns its catalog.
    pub fn into_catalog(self) -> RegionCatalog {
        self.catalog
    }

    /// Runs all remaining days.
    pub fn run(&mut self) -> &RegionCatalog {
        self.run_with_callbacks(|_, _| {}, |_| {})
    }

    /// Runs all remaining days with callbacks.
    ///
    /// # Arguments
    /// * `on_day` - Called after each day with the day index and the recency state
    /// * `on_region` - Called for every accepted region before it is appended
    pub fn run_with_callbacks<F1, F2>(&mut self, mut on_day: F1, mut on_region: F2) -> &RegionCatalog
    where
        F1: FnMut(u32, &RecencyTracker),
        F2: FnMut(&Region),
    {
        info!(
            ndays = self.config.ndays,
            seed = self.config.seed,
            activity_rate = self.config.activity_rate,
            min_lat = self.config.min_lat_deg,
            max_lat = self.config.max_lat_deg,
            latitude_mode = self.config.latitude_mode.name(),
            start_day = self.next_day,
            "Emergence simulation started"
        );

        while let Some(nday) = self.step_day(&mut on_region) {
            on_day(nday, &self.recency);
        }

        info!(
            days = self.summary.days,
            regions = self.summary.regions,
            large_regions = self.summary.large_regions,
            boosted_cells = self.recency.boosted_cells(),
            "Emergence simulation completed"
        );

        &self.catalog
    }

    /// Simulates the next day, returning its index, or `None` when the run is finished.
    pub fn step_day<F>(&mut self, mut on_region: F) -> Option<u32>
    where
        F: FnMut(&Region),
    {
        if self.is_finished() {
            return None;
        }
        let nday = self.next_day;

        self.recency.advance_all();
        // Resets during this day only affect later days.
        let boost = self.recency.boost_field();
        let mut row_rates = Vec::with_capacity(self.geometry.nlon);

        let cycles: Vec<ActiveCycle> = self.timing.active_cycles(nday).collect();
        for cycle in cycles {
            if self.latest_cycle.map_or(true, |latest| cycle.index > latest) {
                debug!(day = nday, cycle = cycle.index, "Cycle became active");
                self.latest_cycle = Some(cycle.index);
            }
            self.summary.active_cycle_days += 1;

            let stats = latitude_stats(
                cycle.phase,
                self.config.min_lat_deg,
                self.config.max_lat_deg,
                self.config.latitude_mode,
            );
            let total_rate = emergence_envelope(self.config.activity_rate, cycle.phase, &self.ladder);
            let ru0 = latitude_rates(total_rate, stats, &self.geometry);

            for hemisphere in Hemisphere::ALL {
                for (lat_bin, &rate) in ru0.iter().enumerate() {
                    self.sample_row(nday, cycle, hemisphere, lat_bin, rate, &boost, &mut row_rates, &mut on_region);
                }
            }
        }

        self.next_day += 1;
        self.summary.days += 1;
        Some(nday)
    }

    /// Draws at most one emergence for one (cycle, latitude bin, hemisphere) row.
    #[allow(clippy::too_many_arguments)]
    fn sample_row<F>(
        &mut self,
        nday: u32,
        cycle: ActiveCycle,
        hemisphere: Hemisphere,
        lat_bin: usize,
        uncorrelated_rate: f64,
        boost: &[f64],
        row_rates: &mut Vec<f64>,
        on_region: &mut F,
    ) where
        F: FnMut(&Region),
    {
        let row = self.geometry.row_range(lat_bin, hemisphere);
        row_rates.clear();
        row_rates.extend(boost[row.clone()].iter().map(|b| uncorrelated_rate + b));

        let rtot: f64 = row_rates.iter().sum();
        let sumv = rtot * self.ladder.ftot;

        let x: f64 = self.rng.random();
        if sumv <= x {
            return;
        }

        let pick = resolve_ladder(x, row_rates, rtot, &self.ladder.fact);
        let lon_deg = self.geometry.lon_in_bin(pick.lon_bin, self.rng.random());
        let lat_deg = self.geometry.lat_in_bin(lat_bin, self.rng.random());

        let region = to_region(
            &SampledEmergence {
                day: nday,
                cycle_index: cycle.index,
                lon_deg,
                lat_deg,
                hemisphere,
                size_class: pick.size_class,
            },
            &self.ladder,
        );

        trace!(
            day = nday,
            cycle = cycle.index,
            hemisphere = hemisphere.short_name(),
            lat_bin,
            lon_bin = pick.lon_bin,
            size_class = pick.size_class,
            "Region emerged"
        );

        on_region(&region);
        self.catalog.push(region);
        self.summary.regions += 1;

        if pick.size_class == 0 {
            self.recency.reset(row.start + pick.lon_bin);
            self.summary.large_regions += 1;
        }
    }
}

/// Runs a full simulation and returns its catalog.
pub fn simulate(config: EmergenceConfig) -> Result<RegionCatalog, ConfigError> {
    let mut simulation = Simulation::new(config)?;
    simulation.run();
    Ok(simulation.into_catalog())
}
