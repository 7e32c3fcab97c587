//! Conversion of sampled bin positions into catalog coordinates.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::catalog::Region;
use crate::emergence::{Hemisphere, SizeLadder};

/// Angular width assigned to every region (degrees).
pub const REGION_WIDTH_DEG: f64 = 4.0;

/// Peak flux per unit squared bipole separation.
pub const FLUX_PER_SEPARATION_SQ: f64 = 2.5;

/// Parity of a cycle index.
///
/// Carried through the converter for callers that want to flip polarity between
/// cycles; the returned geometry does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleParity {
    Even,
    Odd,
}

impl CycleParity {
    pub fn from_index(index: i64) -> Self {
        if index.rem_euclid(2) == 0 {
            CycleParity::Even
        } else {
            CycleParity::Odd
        }
    }

    /// +1 for even cycles, -1 for odd ones.
    pub fn sign(&self) -> f64 {
        match self {
            CycleParity::Even => 1.0,
            CycleParity::Odd => -1.0,
        }
    }
}

/// A sampled emergence before conversion to catalog coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledEmergence {
    /// Simulation day of the emergence.
    pub day: u32,
    /// Index of the cycle the region belongs to.
    pub cycle_index: i64,
    /// Longitude in degrees, [0, 360).
    pub lon_deg: f64,
    /// Unsigned latitude in degrees.
    pub lat_deg: f64,
    pub hemisphere: Hemisphere,
    /// Size class (0 = largest).
    pub size_class: usize,
}

/// Converts a sampled emergence into a catalog [`Region`].
///
/// Colatitude is `π/2 - lat` in the north and `π/2 + lat` in the south. Longitude
/// is wrapped into [0, 2π). The flux proxy is `2.5·bsiz²` and the width is a fixed
/// 4° regardless of size class. Cycle parity is accepted but does not change the
/// result.
pub fn to_region(sample: &SampledEmergence, ladder: &SizeLadder) -> Region {
    let _parity = CycleParity::from_index(sample.cycle_index);

    let separation = ladder.separation(sample.size_class);
    let bmax = FLUX_PER_SEPARATION_SQ * separation * separation;

    let lat = sample.lat_deg.to_radians();
    let k = sample.hemisphere.index() as f64;
    let theta = (FRAC_PI_2 - lat + 2.0 * k * lat).clamp(0.0, std::f64::consts::PI);

    Region {
        day: sample.day,
        theta,
        phi: wrap_longitude(sample.lon_deg.to_radians()),
        width: REGION_WIDTH_DEG.to_radians(),
        bmax,
    }
}

/// Wraps a longitude in radians into [0, 2π).
pub fn wrap_longitude(phi: f64) -> f64 {
    let wrapped = phi.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
