#![allow(dead_code)]

use std::path::Path;

use ndarray::Array2;
use rasterstretch::MemRaster;
use rasterstretch::io::writers::tiff::write_tiff_u16;
use rasterstretch::types::GeoTransform;

pub const SIZE: usize = 128;
pub const NODATA_ROWS: usize = 5;

/// 10 m UTM-like transform; the ramp covers x 1000..2280, y 1000..2280
pub const RAMP_GT: GeoTransform = [1000.0, 10.0, 0.0, 2280.0, 0.0, -10.0];

/// Row-major ramp `0..16383` with the top rows forced to nodata 0
pub fn ramp_values() -> Array2<f64> {
    Array2::from_shape_fn((SIZE, SIZE), |(r, c)| {
        if r < NODATA_ROWS {
            0.0
        } else {
            (r * SIZE + c) as f64
        }
    })
}

pub fn ramp_raster() -> MemRaster {
    MemRaster::new(ramp_values(), Some(0.0)).with_geotransform(RAMP_GT)
}

/// The ramp as a georeferenced 16-bit GeoTIFF with GDAL_NODATA = 0
pub fn write_ramp_tiff(path: &Path) {
    let data: Vec<u16> = ramp_values().iter().map(|&v| v as u16).collect();
    write_tiff_u16(path, SIZE, SIZE, &data, Some(RAMP_GT), Some(0.0)).unwrap();
}

/// A GeoTIFF whose pixels are all nodata
pub fn write_empty_tiff(path: &Path) {
    let data = vec![0u16; 16 * 16];
    write_tiff_u16(path, 16, 16, &data, None, Some(0.0)).unwrap();
}

/// Histogram bin width of the valid ramp values at `bins` bins
pub fn ramp_bin_width(bins: usize) -> f64 {
    let min = (NODATA_ROWS * SIZE) as f64;
    let max = (SIZE * SIZE - 1) as f64;
    (max - min) / bins as f64
}
