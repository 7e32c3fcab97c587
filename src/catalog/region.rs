//! Emerged active-region record.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::emergence::Hemisphere;

/// A single active region at the moment of emergence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Simulation day of emergence.
    pub day: u32,
    /// Colatitude in radians (0 = north pole, π/2 = equator).
    pub theta: f64,
    /// Longitude in radians, [0, 2π).
    pub phi: f64,
    /// Angular width in radians.
    pub width: f64,
    /// Peak flux proxy.
    pub bmax: f64,
}

impl Region {
    /// Hemisphere the region emerged in. Equatorial regions count as north.
    pub fn hemisphere(&self) -> Hemisphere {
        if self.theta > FRAC_PI_2 {
            Hemisphere::South
        } else {
            Hemisphere::North
        }
    }

    /// Signed latitude in degrees (positive north).
    pub fn latitude_deg(&self) -> f64 {
        90.0 - self.theta.to_degrees()
    }

    /// Longitude in degrees.
    pub fn longitude_deg(&self) -> f64 {
        self.phi.to_degrees()
    }
}
