//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, TIFF, GDAL, archive and JSON errors, and provides
//! semantic variants for precondition violations on percentile requests.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::gdal::GdalError),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid percentile cuts: lower={lower}, upper={upper} (need 0 <= lower < upper <= {scale})")]
    InvalidPercentiles { lower: f64, upper: f64, scale: f64 },

    #[error("Histogram bin count must be at least 1, got: {bins}")]
    InvalidBinCount { bins: usize },

    #[error("Band index {band} out of range (raster has {count} band(s))")]
    InvalidBand { band: usize, count: usize },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }
}
