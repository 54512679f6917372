use std::collections::HashMap;
use std::path::Path;

use gdal::raster::ResampleAlg;
use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::Array2;
use thiserror::Error;

use crate::io::raster::{RasterSource, Window, ensure_band};
use crate::types::{GeoTransform, PIXEL_GEOTRANSFORM};

/// Errors encountered when using the GDAL raster source
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1}, got {2} values")]
    DimensionMismatch(usize, usize, usize),
}

/// Metadata extracted from a GDAL-supported dataset
#[derive(Debug, Clone)]
pub struct GdalMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients
    pub geotransform: GeoTransform,
    /// Declared nodata per band (index 0 is band 1)
    pub nodata: Vec<Option<f64>>,
    /// Additional metadata key-value pairs
    pub metadata: HashMap<String, String>,
}

/// Raster source backed by any GDAL-readable dataset (GeoTIFF, VRT, NetCDF, ...)
pub struct GdalRaster {
    pub dataset: Dataset,
    pub metadata: GdalMetadata,
}

impl GdalRaster {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = dataset.geo_transform().unwrap_or(PIXEL_GEOTRANSFORM);

        let mut nodata = Vec::with_capacity(bands);
        for index in 1..=bands {
            nodata.push(dataset.rasterband(index)?.no_data_value());
        }

        // Collect metadata entries (domain "")
        let mut metadata_map = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata_map.insert(key.to_string(), val.to_string());
                }
            }
        }

        Ok(GdalRaster {
            dataset,
            metadata: GdalMetadata {
                size_x,
                size_y,
                bands,
                geotransform,
                nodata,
                metadata: metadata_map,
            },
        })
    }

    fn read_window_gdal(
        &self,
        band: usize,
        window: Window,
        buffer: (usize, usize),
    ) -> Result<Array2<f64>, GdalError> {
        let rasterband = self.dataset.rasterband(band)?;
        let buf = rasterband.read_as::<f64>(
            (window.col as isize, window.row as isize),
            (window.cols, window.rows),
            buffer,
            Some(ResampleAlg::NearestNeighbour),
        )?;
        let data_vec = buf.data().to_vec();
        let len = data_vec.len();
        Array2::from_shape_vec((buffer.1, buffer.0), data_vec)
            .map_err(|_| GdalError::DimensionMismatch(buffer.0, buffer.1, len))
    }
}

impl RasterSource for GdalRaster {
    fn size(&self) -> (usize, usize) {
        (self.metadata.size_x, self.metadata.size_y)
    }

    fn band_count(&self) -> usize {
        self.metadata.bands
    }

    fn geotransform(&self) -> GeoTransform {
        self.metadata.geotransform
    }

    fn nodata(&self, band: usize) -> Option<f64> {
        self.metadata.nodata.get(band.wrapping_sub(1)).copied().flatten()
    }

    fn read_window(
        &self,
        band: usize,
        window: Window,
        buffer: (usize, usize),
    ) -> crate::Result<Array2<f64>> {
        ensure_band(self, band)?;
        Ok(self.read_window_gdal(band, window, buffer)?)
    }
}
