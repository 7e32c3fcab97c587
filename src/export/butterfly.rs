//! Butterfly diagram: latitude of every region against its emergence day.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, Rgb, RgbImage};

use crate::catalog::RegionCatalog;

use super::ExportError;

/// Options for butterfly diagram export.
#[derive(Debug, Clone)]
pub struct ButterflyOptions {
    /// Image width in pixels (time axis).
    pub width: u32,
    /// Image height in pixels (latitude axis).
    pub height: u32,
    /// Latitude shown at the top edge; the bottom edge is its negative.
    pub lat_limit_deg: f64,
    /// Marker area for a region of median flux, in square pixels.
    pub marker_area: f64,
    /// Marker color.
    pub color: [u8; 3],
    /// Marker opacity in [0, 1].
    pub alpha: f32,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for ButterflyOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            lat_limit_deg: 45.0,
            marker_area: 10.0,
            color: [0x99, 0x66, 0x99],
            alpha: 0.5,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

const BACKGROUND: [u8; 3] = [255, 255, 255];
const EQUATOR: [u8; 3] = [200, 200, 200];

/// Renders the butterfly diagram into an RGB image.
///
/// Marker area scales with `bmax` relative to the catalog median.
pub fn render_butterfly(
    catalog: &RegionCatalog,
    ndays: u32,
    options: &ButterflyOptions,
) -> Result<RgbImage, ExportError> {
    let (width, height) = (options.width, options.height);
    if width == 0 || height == 0 || !(options.lat_limit_deg > 0.0) {
        return Err(ExportError::InvalidDimensions(width, height));
    }
    if ndays == 0 {
        return Err(ExportError::EmptyTimeAxis);
    }

    let mut img = RgbImage::from_pixel(width, height, Rgb(BACKGROUND));

    let equator_y = height / 2;
    for x in 0..width {
        img.put_pixel(x, equator_y, Rgb(EQUATOR));
    }

    let Some(median) = catalog.median_bmax() else {
        return Ok(img);
    };

    let x_scale = f64::from(width) / f64::from(ndays);
    let y_scale = f64::from(height) / (2.0 * options.lat_limit_deg);

    for region in catalog {
        let x = (f64::from(region.day) + 0.5) * x_scale;
        let y = (options.lat_limit_deg - region.latitude_deg()) * y_scale;
        let area = region.bmax / median * options.marker_area;
        let radius = (area / std::f64::consts::PI).sqrt().max(0.5);
        draw_disk(&mut img, x, y, radius, options.color, options.alpha);
    }

    Ok(img)
}

/// Renders and writes the butterfly diagram as an 8-bit RGB PNG.
///
/// # Arguments
/// * `catalog` - Regions to plot
/// * `ndays` - Length of the time axis in days
/// * `path` - Output file path
/// * `options` - Export options
pub fn export_butterfly_png(
    catalog: &RegionCatalog,
    ndays: u32,
    path: &Path,
    options: &ButterflyOptions,
) -> Result<(), ExportError> {
    let img = render_butterfly(catalog, ndays, options)?;

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

/// Alpha-blends a filled disk centered at `(cx, cy)`.
pub(super) fn draw_disk(img: &mut RgbImage, cx: f64, cy: f64, radius: f64, color: [u8; 3], alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    let (w, h) = (img.width() as i64, img.height() as i64);
    let x0 = ((cx - radius).floor() as i64).max(0);
    let x1 = ((cx + radius).ceil() as i64).min(w - 1);
    let y0 = ((cy - radius).floor() as i64).max(0);
    let y1 = ((cy + radius).ceil() as i64).min(h - 1);
    let r2 = radius * radius;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let pixel = img.get_pixel_mut(x as u32, y as u32);
            for c in 0..3 {
                let blended = f32::from(pixel.0[c]) * (1.0 - alpha) + f32::from(color[c]) * alpha;
                pixel.0[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Region;
    use std::f64::consts::FRAC_PI_2;
    use tempfile::tempdir;

    fn region(day: u32, lat_deg: f64) -> Region {
        Region {
            day,
            theta: FRAC_PI_2 - lat_deg.to_radians(),
            phi: 0.0,
            width: 0.07,
            bmax: 100.0,
        }
    }

    fn is_background(img: &RgbImage, x: u32, y: u32) -> bool {
        img.get_pixel(x, y).0 == BACKGROUND
    }

    #[test]
    fn test_markers_land_at_day_and_latitude() {
        let mut catalog = RegionCatalog::new();
        catalog.push(region(25, 22.5));
        let options = ButterflyOptions {
            width: 100,
            height: 90,
            lat_limit_deg: 45.0,
            marker_area: 30.0,
            alpha: 1.0,
            ..Default::default()
        };
        let img = render_butterfly(&catalog, 100, &options).unwrap();
        // Day 25 of 100 → x ≈ 25; latitude 22.5 of ±45 → y ≈ 22.
        assert_eq!(img.get_pixel(25, 22).0, options.color);
        assert!(is_background(&img, 75, 67));
    }

    #[test]
    fn test_empty_catalog_renders_blank_plot() {
        let img = render_butterfly(&RegionCatalog::new(), 10, &ButterflyOptions::default()).unwrap();
        assert!(is_background(&img, 10, 10));
        assert_eq!(img.get_pixel(10, 300).0, EQUATOR);
    }

    #[test]
    fn test_invalid_dimensions() {
        let options = ButterflyOptions {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            render_butterfly(&RegionCatalog::new(), 10, &options),
            Err(ExportError::InvalidDimensions(0, 600))
        ));
        assert!(matches!(
            render_butterfly(&RegionCatalog::new(), 0, &ButterflyOptions::default()),
            Err(ExportError::EmptyTimeAxis)
        ));
    }

    #[test]
    fn test_export_butterfly_png() {
        let mut catalog = RegionCatalog::new();
        catalog.push(region(3, 10.0));
        catalog.push(region(8, -20.0));

        let dir = tempdir().unwrap();
        let path = dir.path().join("butterfly.png");
        export_butterfly_png(&catalog, 10, &path, &ButterflyOptions::default()).unwrap();

        assert!(path.exists());
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }
}
