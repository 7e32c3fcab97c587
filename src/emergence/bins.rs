//! Spatial binning of the active band and the bipole size ladder.

use super::config::{BinConfig, SizeConfig};

/// Stellar hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// Both hemispheres in scan order.
    pub const ALL: [Hemisphere; 2] = [Hemisphere::North, Hemisphere::South];

    /// Returns the index of this hemisphere (0 = north, 1 = south).
    pub fn index(&self) -> usize {
        match self {
            Hemisphere::North => 0,
            Hemisphere::South => 1,
        }
    }

    /// Returns the short name of the hemisphere.
    pub fn short_name(&self) -> &'static str {
        match self {
            Hemisphere::North => "north",
            Hemisphere::South => "south",
        }
    }
}

/// Slack allowed by [`BinGeometry::locate`] for coordinates that went through
/// a degree/radian round trip.
pub const LOCATE_TOLERANCE_DEG: f64 = 1e-9;

/// A single (longitude bin, latitude bin, hemisphere) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub lon_bin: usize,
    pub lat_bin: usize,
    pub hemisphere: Hemisphere,
}

impl Cell {
    pub fn new(lon_bin: usize, lat_bin: usize, hemisphere: Hemisphere) -> Self {
        Self {
            lon_bin,
            lat_bin,
            hemisphere,
        }
    }
}

/// Fixed partition of longitude × latitude × hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct BinGeometry {
    /// Number of longitude bins.
    pub nlon: usize,
    /// Number of latitude bins per hemisphere.
    pub nlat: usize,
    /// Lowest active latitude (degrees).
    pub min_lat: f64,
    /// Highest active latitude (degrees).
    pub max_lat: f64,
    /// Longitude bin width (degrees).
    pub dlon: f64,
    /// Latitude bin width (degrees).
    pub dlat: f64,
}

impl BinGeometry {
    /// Partitions [0°, 360°) into `nlon` bins and [min_lat, max_lat] into `nlat` bins.
    pub fn new(min_lat: f64, max_lat: f64, nlon: usize, nlat: usize) -> Self {
        Self {
            nlon,
            nlat,
            min_lat,
            max_lat,
            dlon: 360.0 / nlon as f64,
            dlat: (max_lat - min_lat) / nlat as f64,
        }
    }

    /// Creates the geometry from a bin configuration.
    pub fn from_config(min_lat: f64, max_lat: f64, bins: &BinConfig) -> Self {
        Self::new(min_lat, max_lat, bins.nlon, bins.nlat)
    }

    /// Total number of cells across both hemispheres.
    pub fn num_cells(&self) -> usize {
        self.nlon * self.nlat * 2
    }

    /// Latitude at the center of bin `lat_bin` (degrees).
    pub fn lat_center(&self, lat_bin: usize) -> f64 {
        self.min_lat + self.dlat * (lat_bin as f64 + 0.5)
    }

    /// Continuous longitude (degrees) at fractional offset `frac` ∈ [0, 1) within a bin.
    pub fn lon_in_bin(&self, lon_bin: usize, frac: f64) -> f64 {
        self.dlon * (frac + lon_bin as f64)
    }

    /// Continuous latitude (degrees) at fractional offset `frac` ∈ [0, 1) within a bin.
    pub fn lat_in_bin(&self, lat_bin: usize, frac: f64) -> f64 {
        self.min_lat + self.dlat * (frac + lat_bin as f64)
    }

    /// Flat index of a cell: longitude varies fastest, hemisphere slowest.
    pub fn cell_index(&self, cell: Cell) -> usize {
        (cell.hemisphere.index() * self.nlat + cell.lat_bin) * self.nlon + cell.lon_bin
    }

    /// Inverse of [`BinGeometry::cell_index`].
    pub fn cell_at(&self, index: usize) -> Cell {
        let lon_bin = index % self.nlon;
        let rest = index / self.nlon;
        let lat_bin = rest % self.nlat;
        let hemisphere = if rest / self.nlat == 0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        };
        Cell::new(lon_bin, lat_bin, hemisphere)
    }

    /// Range of flat indices covering every longitude bin of one (latitude, hemisphere) row.
    pub fn row_range(&self, lat_bin: usize, hemisphere: Hemisphere) -> std::ops::Range<usize> {
        let start = self.cell_index(Cell::new(0, lat_bin, hemisphere));
        start..start + self.nlon
    }

    /// Cell containing a position, or `None` outside the active band.
    ///
    /// `lat_deg` is signed (positive north). Positions within [`LOCATE_TOLERANCE_DEG`]
    /// of a band edge snap to the nearest edge bin.
    pub fn locate(&self, lon_deg: f64, lat_deg: f64) -> Option<Cell> {
        let hemisphere = if lat_deg < 0.0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        };
        let lat = lat_deg.abs();
        let inside = lat >= self.min_lat - LOCATE_TOLERANCE_DEG && lat <= self.max_lat + LOCATE_TOLERANCE_DEG;
        if !inside || !lon_deg.is_finite() {
            return None;
        }

        // Negative offsets saturate to bin 0 in the cast.
        let lat_bin = (((lat - self.min_lat) / self.dlat) as usize).min(self.nlat.saturating_sub(1));
        let lon_bin = ((lon_deg.rem_euclid(360.0) / self.dlon) as usize).min(self.nlon.saturating_sub(1));
        Some(Cell::new(lon_bin, lat_bin, hemisphere))
    }
}

/// Discrete bipole size classes with their relative frequencies.
///
/// Class 0 is the largest. Larger class indices are smaller and more frequent.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeLadder {
    /// Bipole separation per class (degrees).
    pub bsiz: Vec<f64>,
    /// Area reduction factor per class, used as relative frequency weight.
    pub fact: Vec<f64>,
    /// Sum of `fact`.
    pub ftot: f64,
    /// Width of one ln(area) class, `exp(delt/2) - exp(-delt/2)`.
    pub dcon: f64,
    /// Area of the largest bipoles (deg²).
    pub amax: f64,
}

impl SizeLadder {
    pub fn new(nbin: usize, delt: f64, amax: f64) -> Self {
        let fact: Vec<f64> = (0..nbin).map(|k| (delt * k as f64).exp()).collect();
        let bsiz = fact.iter().map(|f| (amax / f).sqrt()).collect();
        let ftot = fact.iter().sum();

        Self {
            bsiz,
            fact,
            ftot,
            dcon: (0.5 * delt).exp() - (-0.5 * delt).exp(),
            amax,
        }
    }

    /// Creates the ladder from a size configuration.
    pub fn from_config(sizes: &SizeConfig) -> Self {
        Self::new(sizes.nbin, sizes.delt, sizes.amax)
    }

    /// Number of size classes.
    pub fn len(&self) -> usize {
        self.fact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fact.is_empty()
    }

    /// Index of the last (smallest, most frequent) class.
    pub fn last_class(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// Bipole separation of `size_class`, clamped to the last class.
    pub fn separation(&self, size_class: usize) -> f64 {
        self.bsiz[size_class.min(self.last_class())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_widths() {
        let geometry = BinGeometry::new(5.0, 35.0, 36, 16);
        assert_eq!(geometry.dlon, 10.0);
        assert!((geometry.dlat - 1.875).abs() < 1e-12);
        assert_eq!(geometry.num_cells(), 36 * 16 * 2);
    }

    #[test]
    fn test_lat_centers_stay_inside_band() {
        let geometry = BinGeometry::new(5.0, 35.0, 36, 16);
        assert!((geometry.lat_center(0) - 5.9375).abs() < 1e-12);
        for j in 0..geometry.nlat {
            let c = geometry.lat_center(j);
            assert!(c > geometry.min_lat && c < geometry.max_lat);
        }
    }

    #[test]
    fn test_cell_index_round_trip() {
        let geometry = BinGeometry::new(5.0, 35.0, 36, 16);
        for index in [0, 1, 35, 36, 575, 576, 1151] {
            let cell = geometry.cell_at(index);
            assert_eq!(geometry.cell_index(cell), index);
        }
        let south = geometry.cell_at(576);
        assert_eq!(south, Cell::new(0, 0, Hemisphere::South));
    }

    #[test]
    fn test_row_range_spans_longitudes() {
        let geometry = BinGeometry::new(5.0, 35.0, 36, 16);
        let row = geometry.row_range(3, Hemisphere::South);
        assert_eq!(row.len(), 36);
        assert_eq!(geometry.cell_at(row.start), Cell::new(0, 3, Hemisphere::South));
        assert_eq!(geometry.cell_at(row.end - 1), Cell::new(35, 3, Hemisphere::South));
    }

    #[test]
    fn test_continuous_positions_stay_in_bin() {
        let geometry = BinGeometry::new(5.0, 35.0, 36, 16);
        let lon = geometry.lon_in_bin(35, 0.999_999);
        assert!(lon < 360.0 && lon >= 350.0);
        let lat = geometry.lat_in_bin(15, 0.999_999);
        assert!(lat < 35.0 && lat >= 33.125);
    }

    #[test]
    fn test_locate_inverts_continuous_positions() {
        let geometry = BinGeometry::new(5.0, 35.0, 36, 16);
        let lon = geometry.lon_in_bin(17, 0.4);
        let lat = geometry.lat_in_bin(9, 0.6);
        assert_eq!(geometry.locate(lon, lat), Some(Cell::new(17, 9, Hemisphere::North)));
        assert_eq!(geometry.locate(lon, -lat), Some(Cell::new(17, 9, Hemisphere::South)));
        assert_eq!(geometry.locate(0.0, 35.0), Some(Cell::new(0, 15, Hemisphere::North)));
        assert_eq!(geometry.locate(10.0, 2.0), None);
        assert_eq!(geometry.locate(10.0, -40.0), None);
    }

    #[test]
    fn test_size_ladder_values() {
        let ladder = SizeLadder::new(5, 0.5, 100.0);
        assert_eq!(ladder.len(), 5);
        assert_eq!(ladder.fact[0], 1.0);
        assert_eq!(ladder.bsiz[0], 10.0);
        for k in 1..ladder.len() {
            assert!(ladder.fact[k] > ladder.fact[k - 1], "weights grow with class");
            assert!(ladder.bsiz[k] < ladder.bsiz[k - 1], "sizes shrink with class");
        }
        let sum: f64 = ladder.fact.iter().sum();
        assert!((ladder.ftot - sum).abs() < 1e-12);
        assert!((ladder.dcon - (0.25f64.exp() - (-0.25f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_separation_clamps_to_last_class() {
        let ladder = SizeLadder::new(3, 0.5, 100.0);
        assert_eq!(ladder.separation(10), ladder.bsiz[2]);
    }

    #[test]
    fn test_hemisphere_indices() {
        assert_eq!(Hemisphere::North.index(), 0);
        assert_eq!(Hemisphere::South.index(), 1);
        assert_eq!(Hemisphere::ALL.len(), 2);
    }
}
