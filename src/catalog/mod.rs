//! Append-only catalog of emerged active regions.
//!
//! Regions are stored in emergence order. Within a day the order follows the
//! sampler's cell scan, which is fixed for a given seed.

mod region;

pub use region::Region;

use serde::{Deserialize, Serialize};

use crate::emergence::Hemisphere;

/// Ordered, append-only sequence of [`Region`] records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a region. Regions must arrive in non-decreasing day order.
    pub fn push(&mut self, region: Region) {
        debug_assert!(
            self.regions.last().map_or(true, |last| last.day <= region.day),
            "regions must be appended in chronological order"
        );
        self.regions.push(region);
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    /// Earliest region in the catalog.
    pub fn first(&self) -> Option<&Region> {
        self.regions.first()
    }

    /// Most recent region in the catalog.
    pub fn last(&self) -> Option<&Region> {
        self.regions.last()
    }

    /// Regions of one hemisphere, in emergence order.
    pub fn in_hemisphere(&self, hemisphere: Hemisphere) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter().filter(move |r| r.hemisphere() == hemisphere)
    }

    /// Regions that emerged within `[start, end)` days.
    pub fn in_days(&self, start: u32, end: u32) -> &[Region] {
        let lo = self.regions.partition_point(|r| r.day < start);
        let hi = self.regions.partition_point(|r| r.day < end);
        &self.regions[lo..hi.max(lo)]
    }

    /// Median peak flux, or `None` for an empty catalog.
    pub fn median_bmax(&self) -> Option<f64> {
        if self.regions.is_empty() {
            return None;
        }
        let mut values: Vec<f64> = self.regions.iter().map(|r| r.bmax).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        Some(if values.len() % 2 == 0 {
            0.5 * (values[mid - 1] + values[mid])
        } else {
            values[mid]
        })
    }

    pub fn into_vec(self) -> Vec<Region> {
        self.regions
    }
}

impl<'a> IntoIterator for &'a RegionCatalog {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(day: u32, theta: f64, bmax: f64) -> Region {
        Region {
            day,
            theta,
            phi: 1.0,
            width: 0.07,
            bmax,
        }
    }

    #[test]
    fn test_push_preserves_order() {
        let mut catalog = RegionCatalog::new();
        assert!(catalog.is_empty());
        catalog.push(region(1, 1.0, 10.0));
        catalog.push(region(1, 2.0, 20.0));
        catalog.push(region(5, 1.2, 30.0));

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.first().unwrap().day, 1);
        assert_eq!(catalog.last().unwrap().day, 5);
        let days: Vec<u32> = catalog.iter().map(|r| r.day).collect();
        assert_eq!(days, vec![1, 1, 5]);
    }

    #[test]
    fn test_hemisphere_filter() {
        let mut catalog = RegionCatalog::new();
        catalog.push(region(0, 1.0, 10.0));
        catalog.push(region(0, 2.0, 10.0));
        catalog.push(region(2, 2.5, 10.0));
        assert_eq!(catalog.in_hemisphere(Hemisphere::North).count(), 1);
        assert_eq!(catalog.in_hemisphere(Hemisphere::South).count(), 2);
    }

    #[test]
    fn test_day_window() {
        let mut catalog = RegionCatalog::new();
        for day in [0, 3, 3, 7, 10] {
            catalog.push(region(day, 1.0, 1.0));
        }
        assert_eq!(catalog.in_days(3, 8).len(), 3);
        assert!(catalog.in_days(11, 20).is_empty());
        assert!(catalog.in_days(8, 3).is_empty());
    }

    #[test]
    fn test_median_bmax() {
        let mut catalog = RegionCatalog::new();
        assert_eq!(catalog.median_bmax(), None);
        catalog.push(region(0, 1.0, 30.0));
        catalog.push(region(0, 1.0, 10.0));
        catalog.push(region(0, 1.0, 20.0));
        assert_eq!(catalog.median_bmax(), Some(20.0));
        catalog.push(region(1, 1.0, 40.0));
        assert_eq!(catalog.median_bmax(), Some(25.0));
    }

    #[test]
    fn test_serializes_as_array() {
        let mut catalog = RegionCatalog::new();
        catalog.push(region(2, 1.0, 5.0));
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(json.starts_with('['));
        let parsed: RegionCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, catalog);
    }
}
