use ndarray::{Array2, ArrayView2, s};

use crate::error::{Error, Result};
use crate::types::{GeoTransform, PIXEL_GEOTRANSFORM};

/// Pixel window of a raster: offset and size in pixels
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub col: usize,
    pub row: usize,
    pub cols: usize,
    pub rows: usize,
}

impl Window {
    /// Window covering a whole raster of `(cols, rows)`
    pub fn full((cols, rows): (usize, usize)) -> Self {
        Self {
            col: 0,
            row: 0,
            cols,
            rows,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.cols * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }
}

/// Read-only access to the bands of a raster.
///
/// Bands are 1-based, matching GDAL. Implementations return band data as
/// `f64` whatever the stored sample type is.
pub trait RasterSource {
    /// Raster size as `(cols, rows)`
    fn size(&self) -> (usize, usize);

    fn band_count(&self) -> usize;

    fn geotransform(&self) -> GeoTransform {
        PIXEL_GEOTRANSFORM
    }

    /// Declared nodata value of a band, if any
    fn nodata(&self, band: usize) -> Option<f64>;

    /// Read `window` of `band` into an array of shape `(buffer.1, buffer.0)`.
    /// When the buffer is smaller than the window the band is sampled with
    /// nearest neighbour.
    fn read_window(&self, band: usize, window: Window, buffer: (usize, usize))
    -> Result<Array2<f64>>;
}

/// Fail with `InvalidBand` unless `band` is a valid 1-based index of `source`
pub fn ensure_band<R: RasterSource + ?Sized>(source: &R, band: usize) -> Result<()> {
    let count = source.band_count();
    if band == 0 || band > count {
        return Err(Error::InvalidBand { band, count });
    }
    Ok(())
}

fn ensure_window_inside(size: (usize, usize), window: Window) -> Result<()> {
    if window.col + window.cols > size.0 || window.row + window.rows > size.1 {
        return Err(Error::InvalidArgument {
            arg: "window",
            value: format!("{:?} exceeds raster size {}x{}", window, size.0, size.1),
        });
    }
    Ok(())
}

/// Nearest-neighbour resample of `src` to `(cols, rows)`
pub fn resample_nearest(src: ArrayView2<'_, f64>, (cols, rows): (usize, usize)) -> Array2<f64> {
    let (src_rows, src_cols) = src.dim();
    if src_rows == rows && src_cols == cols {
        return src.to_owned();
    }
    if src_rows == 0 || src_cols == 0 {
        return Array2::zeros((rows, cols));
    }
    let y_ratio = src_rows as f64 / rows as f64;
    let x_ratio = src_cols as f64 / cols as f64;
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        // Sample at the centre of each destination pixel
        let sr = (((r as f64 + 0.5) * y_ratio) as usize).min(src_rows - 1);
        let sc = (((c as f64 + 0.5) * x_ratio) as usize).min(src_cols - 1);
        src[(sr, sc)]
    })
}

/// Read a window from fully loaded band data
pub(crate) fn read_loaded_window(
    data: &Array2<f64>,
    window: Window,
    buffer: (usize, usize),
) -> Result<Array2<f64>> {
    let (rows, cols) = data.dim();
    ensure_window_inside((cols, rows), window)?;
    let view = data.slice(s![
        window.row..window.row + window.rows,
        window.col..window.col + window.cols
    ]);
    Ok(resample_nearest(view, buffer))
}

/// Raster held in memory, one `(rows, cols)` array per band
#[derive(Debug, Clone)]
pub struct MemRaster {
    bands: Vec<Array2<f64>>,
    nodata: Vec<Option<f64>>,
    geotransform: GeoTransform,
}

impl MemRaster {
    /// Single-band raster in pixel coordinates
    pub fn new(data: Array2<f64>, nodata: Option<f64>) -> Self {
        Self {
            bands: vec![data],
            nodata: vec![nodata],
            geotransform: PIXEL_GEOTRANSFORM,
        }
    }

    pub fn with_geotransform(mut self, geotransform: GeoTransform) -> Self {
        self.geotransform = geotransform;
        self
    }

    /// Append a band; its shape must match the existing bands
    pub fn push_band(&mut self, data: Array2<f64>, nodata: Option<f64>) -> Result<()> {
        if let Some(first) = self.bands.first() {
            if first.dim() != data.dim() {
                return Err(Error::InvalidArgument {
                    arg: "band shape",
                    value: format!("{:?} (expected {:?})", data.dim(), first.dim()),
                });
            }
        }
        self.bands.push(data);
        self.nodata.push(nodata);
        Ok(())
    }

    pub fn set_nodata(&mut self, band: usize, nodata: Option<f64>) -> Result<()> {
        ensure_band(self, band)?;
        self.nodata[band - 1] = nodata;
        Ok(())
    }

    pub fn band(&self, band: usize) -> Result<&Array2<f64>> {
        ensure_band(self, band)?;
        Ok(&self.bands[band - 1])
    }
}

impl RasterSource for MemRaster {
    fn size(&self) -> (usize, usize) {
        self.bands
            .first()
            .map(|b| (b.ncols(), b.nrows()))
            .unwrap_or((0, 0))
    }

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn geotransform(&self) -> GeoTransform {
        self.geotransform
    }

    fn nodata(&self, band: usize) -> Option<f64> {
        self.nodata.get(band.wrapping_sub(1)).copied().flatten()
    }

    fn read_window(
        &self,
        band: usize,
        window: Window,
        buffer: (usize, usize),
    ) -> Result<Array2<f64>> {
        read_loaded_window(self.band(band)?, window, buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64)
    }

    #[test]
    fn reads_full_and_partial_windows() {
        let raster = MemRaster::new(grid(4, 6), Some(0.0));
        assert_eq!(raster.size(), (6, 4));
        assert_eq!(raster.nodata(1), Some(0.0));
        assert_eq!(raster.nodata(2), None);

        let all = raster
            .read_window(1, Window::full(raster.size()), (6, 4))
            .unwrap();
        assert_eq!(all, grid(4, 6));

        let win = Window {
            col: 2,
            row: 1,
            cols: 3,
            rows: 2,
        };
        let part = raster.read_window(1, win, (3, 2)).unwrap();
        assert_eq!(part[(0, 0)], 8.0);
        assert_eq!(part[(1, 2)], 16.0);
    }

    #[test]
    fn decimated_read_samples_nearest_pixel_centres() {
        let raster = MemRaster::new(grid(4, 4), None);
        let half = raster
            .read_window(1, Window::full((4, 4)), (2, 2))
            .unwrap();
        assert_eq!(half.dim(), (2, 2));
        assert_eq!(half[(0, 0)], 5.0);
        assert_eq!(half[(1, 1)], 15.0);
    }

    #[test]
    fn rejects_bad_band_and_window() {
        let raster = MemRaster::new(grid(2, 2), None);
        assert!(matches!(
            raster.read_window(0, Window::full((2, 2)), (2, 2)),
            Err(Error::InvalidBand { band: 0, count: 1 })
        ));
        assert!(matches!(
            raster.read_window(2, Window::full((2, 2)), (2, 2)),
            Err(Error::InvalidBand { band: 2, count: 1 })
        ));
        assert!(raster.read_window(1, Window::full((3, 2)), (3, 2)).is_err());
    }

    #[test]
    fn push_band_checks_shape() {
        let mut raster = MemRaster::new(grid(2, 3), None);
        assert!(raster.push_band(grid(3, 2), None).is_err());
        raster.push_band(grid(2, 3), Some(-1.0)).unwrap();
        assert_eq!(raster.band_count(), 2);
        assert_eq!(raster.nodata(2), Some(-1.0));
    }
}
