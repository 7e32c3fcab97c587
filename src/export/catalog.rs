//! Region catalog export as CSV or JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::catalog::RegionCatalog;

use super::ExportError;

/// Column header of the CSV catalog.
pub const CSV_HEADER: &str = "day,theta,phi,width,bmax";

/// Writes the catalog as CSV, one region per line in emergence order.
pub fn write_catalog_csv<W: Write>(catalog: &RegionCatalog, mut writer: W) -> Result<(), ExportError> {
    writeln!(writer, "{CSV_HEADER}")?;
    for region in catalog {
        writeln!(
            writer,
            "{},{},{},{},{}",
            region.day, region.theta, region.phi, region.width, region.bmax
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports the catalog as a CSV file.
pub fn export_catalog_csv(catalog: &RegionCatalog, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_catalog_csv(catalog, BufWriter::new(file))
}

/// Exports the catalog as a pretty-printed JSON array of regions.
pub fn export_catalog_json(catalog: &RegionCatalog, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, catalog)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Region;
    use tempfile::tempdir;

    fn sample_catalog() -> RegionCatalog {
        let mut catalog = RegionCatalog::new();
        catalog.push(Region {
            day: 3,
            theta: 1.25,
            phi: 0.5,
            width: 0.0698,
            bmax: 40.0,
        });
        catalog.push(Region {
            day: 7,
            theta: 2.0,
            phi: 6.0,
            width: 0.0698,
            bmax: 2.5,
        });
        catalog
    }

    #[test]
    fn test_csv_layout() {
        let mut buf = Vec::new();
        write_catalog_csv(&sample_catalog(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "3,1.25,0.5,0.0698,40");
        assert_eq!(lines[2], "7,2,6,0.0698,2.5");
    }

    #[test]
    fn test_empty_catalog_writes_header_only() {
        let mut buf = Vec::new();
        write_catalog_csv(&RegionCatalog::new(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_export_json_reloads() {
        let catalog = sample_catalog();
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.json");
        export_catalog_json(&catalog, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let loaded: RegionCatalog = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_export_csv_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.csv");
        export_catalog_csv(&sample_catalog(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(CSV_HEADER));
    }
}
