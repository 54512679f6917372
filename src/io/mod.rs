//! I/O layer: the `RasterSource` abstraction with in-memory, GeoTIFF and
//! (feature `gdal`) GDAL-backed implementations, plus `writers` for stretched
//! outputs, world files and JSON sidecars.
use std::path::Path;

#[cfg(not(feature = "gdal"))]
use crate::error::Error;
use crate::error::Result;

pub mod raster;
pub use self::raster::{MemRaster, RasterSource, Window};

pub mod tiff;
pub use self::tiff::TiffRaster;

#[cfg(feature = "gdal")]
pub mod gdal;
#[cfg(feature = "gdal")]
pub use self::gdal::{GdalError, GdalMetadata, GdalRaster};

pub mod writers;

/// True for paths with a `.tif`/`.tiff` extension (any case)
pub fn is_tiff_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false)
}

/// Open a raster file with the best available backend.
///
/// With the `gdal` feature every GDAL-readable format is accepted; otherwise
/// only (Geo)TIFF files are.
#[cfg(feature = "gdal")]
pub fn open_raster(path: &Path) -> Result<Box<dyn RasterSource>> {
    Ok(Box::new(GdalRaster::open(path)?))
}

#[cfg(not(feature = "gdal"))]
pub fn open_raster(path: &Path) -> Result<Box<dyn RasterSource>> {
    if !is_tiff_path(path) {
        return Err(Error::UnsupportedFormat(format!(
            "{} (only GeoTIFF without the `gdal` feature)",
            path.display()
        )));
    }
    Ok(Box::new(TiffRaster::open(path)?))
}
