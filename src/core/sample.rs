//! Extent to pixel-window mapping and sample-size limited band reads.
use ndarray::Array2;
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::raster::{RasterSource, Window, ensure_band};
use crate::types::{Extent, GeoTransform};

/// Pixel window covered by `extent` on a raster of `(cols, rows)`.
///
/// The null extent selects the whole raster. Partially covered pixels are
/// included, and the result is clipped to the raster; an extent outside the
/// raster gives an empty window.
pub fn extent_to_window(
    extent: &Extent,
    (cols, rows): (usize, usize),
    gt: &GeoTransform,
) -> Result<Window> {
    if extent.is_empty() {
        return Ok(Window::full((cols, rows)));
    }
    if gt[1] == 0.0 || gt[5] == 0.0 || gt[2] != 0.0 || gt[4] != 0.0 {
        return Err(Error::InvalidArgument {
            arg: "geotransform",
            value: format!("{:?} (need a north-up transform)", gt),
        });
    }

    let xa = (extent.xmin - gt[0]) / gt[1];
    let xb = (extent.xmax - gt[0]) / gt[1];
    let ya = (extent.ymax - gt[3]) / gt[5];
    let yb = (extent.ymin - gt[3]) / gt[5];

    let clip = |v: f64, limit: usize| v.clamp(0.0, limit as f64) as usize;
    let c0 = clip(xa.min(xb).floor(), cols);
    let c1 = clip(xa.max(xb).ceil(), cols);
    let r0 = clip(ya.min(yb).floor(), rows);
    let r1 = clip(ya.max(yb).ceil(), rows);

    Ok(Window {
        col: c0,
        row: r0,
        cols: c1.saturating_sub(c0),
        rows: r1.saturating_sub(r0),
    })
}

/// Buffer size used to read `window` with at most about `sample_size` pixels.
/// A `sample_size` of 0 reads every pixel.
pub fn sample_buffer_size(window: &Window, sample_size: usize) -> (usize, usize) {
    let pixels = window.pixel_count();
    if sample_size == 0 || pixels <= sample_size {
        return (window.cols, window.rows);
    }
    let ratio = (sample_size as f64 / pixels as f64).sqrt();
    let cols = ((window.cols as f64 * ratio).ceil() as usize).clamp(1, window.cols);
    let rows = ((window.rows as f64 * ratio).ceil() as usize).clamp(1, window.rows);
    (cols, rows)
}

/// Read the pixels of `band` inside `extent`, decimated to about `sample_size`.
/// Returns an empty array when the extent misses the raster.
pub fn sample_band<R: RasterSource + ?Sized>(
    source: &R,
    band: usize,
    extent: &Extent,
    sample_size: usize,
) -> Result<Array2<f64>> {
    ensure_band(source, band)?;
    let window = extent_to_window(extent, source.size(), &source.geotransform())?;
    if window.is_empty() {
        debug!("Extent {} does not intersect the raster", extent);
        return Ok(Array2::zeros((0, 0)));
    }
    let buffer = sample_buffer_size(&window, sample_size);
    debug!(
        "Sampling band {} window {:?} at {}x{}",
        band, window, buffer.0, buffer.1
    );
    source.read_window(band, window, buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemRaster;
    use crate::types::PIXEL_GEOTRANSFORM;

    const UTM_GT: GeoTransform = [1000.0, 10.0, 0.0, 2000.0, 0.0, -10.0];

    #[test]
    fn null_extent_is_full_raster() {
        let w = extent_to_window(&Extent::default(), (40, 30), &UTM_GT).unwrap();
        assert_eq!(w, Window::full((40, 30)));
    }

    #[test]
    fn maps_north_up_extent_to_pixels() {
        // x 1050..1105 -> cols 5..10.5, y 1900..1980 -> rows 2..10
        let e = Extent::new(1050.0, 1900.0, 1105.0, 1980.0);
        let w = extent_to_window(&e, (40, 30), &UTM_GT).unwrap();
        assert_eq!(
            w,
            Window {
                col: 5,
                row: 2,
                cols: 6,
                rows: 8
            }
        );
    }

    #[test]
    fn clips_and_misses() {
        let partial = Extent::new(-5.0, -5.0, 3.0, 2.0);
        let w = extent_to_window(&partial, (10, 10), &PIXEL_GEOTRANSFORM).unwrap();
        assert_eq!(
            w,
            Window {
                col: 0,
                row: 0,
                cols: 3,
                rows: 2
            }
        );

        let outside = Extent::new(20.0, 20.0, 30.0, 30.0);
        let w = extent_to_window(&outside, (10, 10), &PIXEL_GEOTRANSFORM).unwrap();
        assert!(w.is_empty());
    }

    #[test]
    fn rotated_transform_is_rejected() {
        let gt = [0.0, 1.0, 0.5, 0.0, 0.5, -1.0];
        let e = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert!(extent_to_window(&e, (4, 4), &gt).is_err());
    }

    #[test]
    fn sample_size_limits_buffer() {
        let w = Window::full((1000, 500));
        assert_eq!(sample_buffer_size(&w, 0), (1000, 500));
        assert_eq!(sample_buffer_size(&w, 1_000_000), (1000, 500));
        let (c, r) = sample_buffer_size(&w, 5000);
        assert!((100..=101).contains(&c), "cols={}", c);
        assert!((50..=51).contains(&r), "rows={}", r);
        assert_eq!(sample_buffer_size(&Window::full((3, 1_000_000)), 10), (1, 1826));
    }

    #[test]
    fn sample_band_outside_extent_is_empty() {
        let raster = MemRaster::new(Array2::ones((4, 4)), None);
        let s = sample_band(&raster, 1, &Extent::new(10.0, 10.0, 12.0, 12.0), 0).unwrap();
        assert_eq!(s.len(), 0);
        assert!(matches!(
            sample_band(&raster, 3, &Extent::default(), 0),
            Err(Error::InvalidBand { .. })
        ));
    }
}
