//! Per-cell memory of recent large emergences.
//!
//! Each cell tracks τ, the number of days since a size-class-0 region emerged in
//! it. While `tau1 <= τ < tau2` the cell gets a flat boost to its emergence rate,
//! which clusters large regions in space and time.

use super::bins::{BinGeometry, Cell};
use super::config::CorrelationConfig;

/// Days-since-last-large-emergence for every cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RecencyTracker {
    tau: Vec<u32>,
    tau1: u32,
    tau2: u32,
    boost: f64,
}

impl RecencyTracker {
    /// Creates a tracker with every cell in the inactive state (τ = `tau2`).
    pub fn new(num_cells: usize, correlation: &CorrelationConfig) -> Self {
        let window = correlation.tau2.saturating_sub(correlation.tau1).max(1);
        Self {
            tau: vec![correlation.tau2; num_cells],
            tau1: correlation.tau1,
            tau2: correlation.tau2,
            boost: correlation.probability / f64::from(window),
        }
    }

    /// Creates a tracker sized for `geometry`.
    pub fn for_geometry(geometry: &BinGeometry, correlation: &CorrelationConfig) -> Self {
        Self::new(geometry.num_cells(), correlation)
    }

    /// Advances every cell by one day.
    pub fn advance_all(&mut self) {
        for tau in &mut self.tau {
            *tau = tau.saturating_add(1);
        }
    }

    /// Rate contribution of cell `index` from the correlation window.
    pub fn emergence_boost(&self, index: usize) -> f64 {
        if self.in_window(self.tau[index]) {
            self.boost
        } else {
            0.0
        }
    }

    /// Boost for every cell, indexed like [`BinGeometry::cell_index`].
    pub fn boost_field(&self) -> Vec<f64> {
        self.tau
            .iter()
            .map(|&tau| if self.in_window(tau) { self.boost } else { 0.0 })
            .collect()
    }

    /// Marks a large emergence in cell `index`.
    pub fn reset(&mut self, index: usize) {
        self.tau[index] = 0;
    }

    /// Marks a large emergence in `cell`.
    pub fn reset_cell(&mut self, geometry: &BinGeometry, cell: Cell) {
        self.reset(geometry.cell_index(cell));
    }

    /// Days since the last large emergence in cell `index`.
    pub fn tau(&self, index: usize) -> u32 {
        self.tau[index]
    }

    /// All recency values, indexed like [`BinGeometry::cell_index`].
    pub fn values(&self) -> &[u32] {
        &self.tau
    }

    /// True when the cell is past the correlation window.
    pub fn is_inactive(&self, index: usize) -> bool {
        self.tau[index] >= self.tau2
    }

    /// Start of the correlation window (days).
    pub fn tau1(&self) -> u32 {
        self.tau1
    }

    /// End of the correlation window and initial τ (days).
    pub fn tau2(&self) -> u32 {
        self.tau2
    }

    /// Number of cells currently inside the correlation window.
    pub fn boosted_cells(&self) -> usize {
        self.tau.iter().filter(|&&tau| self.in_window(tau)).count()
    }

    fn in_window(&self, tau: u32) -> bool {
        self.tau1 <= tau && tau < self.tau2
    }
}
