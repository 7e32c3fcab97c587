//! Export module for saving simulation output.
//!
//! Supports the region catalog as CSV or JSON, a JSON run summary, a butterfly
//! diagram of latitude against time, and per-cell recency maps.

mod butterfly;
mod recency_map;
mod catalog;
mod summary;

use thiserror::Error;

pub use butterfly::{export_butterfly_png, render_butterfly, ButterflyOptions};
pub use recency_map::{export_recency_png, render_recency_map, RecencyMapOptions, RecentRegions};
pub use catalog::{export_catalog_csv, export_catalog_json, write_catalog_csv, CSV_HEADER};
pub use summary::{export_run_summary_json, RunSummary};

/// Errors that can occur during export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid image dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),
    #[error("Time axis must span at least one day")]
    EmptyTimeAxis,
}
