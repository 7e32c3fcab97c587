//! Recency map export.
//!
//! Shades every longitude × latitude cell by its days-since-last-large-emergence,
//! with the northern band drawn above the southern band. Latitude increases
//! toward the top in the north and toward the bottom in the south, so both
//! bands meet near the equator. Regions that emerged in the last few days can
//! be drawn on top, fading with age.

use std::f64::consts::PI;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, Rgb, RgbImage};

use crate::catalog::RegionCatalog;
use crate::emergence::{BinGeometry, Cell, Hemisphere, RecencyTracker};
use crate::geometry::FLUX_PER_SEPARATION_SQ;

use super::butterfly::draw_disk;
use super::ExportError;

/// Options for recency map export.
#[derive(Debug, Clone)]
pub struct RecencyMapOptions {
    /// Edge length of one cell in pixels.
    pub cell_px: u32,
    /// Height of the blank strip between the two bands.
    pub gap_px: u32,
    /// Age in days at which overlaid regions have faded out completely.
    pub fade_days: u32,
    /// Marker area multiplier; a region of separation `s` covers `1.5^s` square pixels at 1.0.
    pub marker_scale: f64,
    /// Color of overlaid regions.
    pub marker_color: [u8; 3],
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for RecencyMapOptions {
    fn default() -> Self {
        Self {
            cell_px: 16,
            gap_px: 2,
            fade_days: 30,
            marker_scale: 1.0,
            marker_color: [204, 51, 51],
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

/// Regions to overlay on a recency map: those that emerged at most
/// `fade_days - 1` days before `day`.
#[derive(Debug, Clone, Copy)]
pub struct RecentRegions<'a> {
    pub catalog: &'a RegionCatalog,
    pub day: u32,
}

/// Shade for τ at or below tau1 (recent emergence).
const RECENT: [f32; 3] = [247.0, 251.0, 255.0];
/// Shade for τ at or above tau2 (inactive cell).
const INACTIVE: [f32; 3] = [8.0, 48.0, 107.0];
const GAP: [u8; 3] = [255, 255, 255];

/// Maps τ to a blue shade, clipping to [tau1, tau2].
fn recency_color(tau: u32, tau1: u32, tau2: u32) -> [u8; 3] {
    let t = if tau2 > tau1 {
        (f64::from(tau.clamp(tau1, tau2) - tau1) / f64::from(tau2 - tau1)) as f32
    } else if tau >= tau2 {
        1.0
    } else {
        0.0
    };
    let mut color = [0u8; 3];
    for c in 0..3 {
        color[c] = (RECENT[c] + (INACTIVE[c] - RECENT[c]) * t).round() as u8;
    }
    color
}

/// Renders the recency field into an RGB image, with optional recent regions on top.
pub fn render_recency_map(
    tracker: &RecencyTracker,
    geometry: &BinGeometry,
    recent: Option<RecentRegions<'_>>,
    options: &RecencyMapOptions,
) -> Result<RgbImage, ExportError> {
    let cell = options.cell_px;
    let width = geometry.nlon as u32 * cell;
    let band_height = geometry.nlat as u32 * cell;
    let height = 2 * band_height + options.gap_px;
    if width == 0 || band_height == 0 {
        return Err(ExportError::InvalidDimensions(width, height));
    }

    let (tau1, tau2) = (tracker.tau1(), tracker.tau2());
    let mut img = RgbImage::from_pixel(width, height, Rgb(GAP));

    for hemisphere in Hemisphere::ALL {
        for lat_bin in 0..geometry.nlat {
            let row = match hemisphere {
                Hemisphere::North => (geometry.nlat - 1 - lat_bin) as u32,
                Hemisphere::South => lat_bin as u32,
            };
            let y0 = match hemisphere {
                Hemisphere::North => row * cell,
                Hemisphere::South => band_height + options.gap_px + row * cell,
            };

            for lon_bin in 0..geometry.nlon {
                let index = geometry.cell_index(Cell::new(lon_bin, lat_bin, hemisphere));
                let color = Rgb(recency_color(tracker.tau(index), tau1, tau2));
                let x0 = lon_bin as u32 * cell;
                for y in y0..y0 + cell {
                    for x in x0..x0 + cell {
                        img.put_pixel(x, y, color);
                    }
                }
            }
        }
    }

    if let Some(recent) = recent {
        draw_recent_regions(&mut img, geometry, recent, options);
    }

    Ok(img)
}

/// Draws regions younger than `fade_days`, opaque on their emergence day.
fn draw_recent_regions(
    img: &mut RgbImage,
    geometry: &BinGeometry,
    recent: RecentRegions<'_>,
    options: &RecencyMapOptions,
) {
    let fade = options.fade_days.max(1);
    let first_day = recent.day.saturating_sub(fade - 1);
    let cell = f64::from(options.cell_px);
    let south_top = geometry.nlat as f64 * cell + f64::from(options.gap_px);

    for region in recent.catalog.in_days(first_day, recent.day.saturating_add(1)) {
        let age = recent.day - region.day;
        let alpha = 1.0 - age as f32 / fade as f32;

        let lat = region.latitude_deg();
        let x = region.longitude_deg() / geometry.dlon * cell;
        let y = match region.hemisphere() {
            Hemisphere::North => (geometry.max_lat - lat) / geometry.dlat * cell,
            Hemisphere::South => south_top + (lat.abs() - geometry.min_lat) / geometry.dlat * cell,
        };

        let separation = (region.bmax / FLUX_PER_SEPARATION_SQ).sqrt();
        let area = options.marker_scale * 1.5f64.powf(separation);
        let radius = (area / PI).sqrt().max(0.5);
        draw_disk(img, x, y, radius, options.marker_color, alpha);
    }
}

/// Renders and writes the recency map as an 8-bit RGB PNG.
///
/// # Arguments
/// * `tracker` - Recency state to shade
/// * `geometry` - Bin layout matching the tracker
/// * `recent` - Optional catalog and current day for the fading region overlay
/// * `path` - Output file path
/// * `options` - Export options
pub fn export_recency_png(
    tracker: &RecencyTracker,
    geometry: &BinGeometry,
    recent: Option<RecentRegions<'_>>,
    path: &Path,
    options: &RecencyMapOptions,
) -> Result<(), ExportError> {
    let img = render_recency_map(tracker, geometry, recent, options)?;

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(())
}
