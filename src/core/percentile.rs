//! Percentile ("cumulative cut") bounds for contrast stretching.
//!
//! [`percentile_from_hist`] approximates the cut with a fixed-bin histogram;
//! [`cumulative_cut`] is the exact sorted-sample computation it is checked
//! against. Both agree to within one bin width.
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::histogram::{Histogram, is_valid_sample};
use crate::core::nodata::NodataOverride;
use crate::core::sample::sample_band;
use crate::error::{Error, Result};
use crate::io::raster::{RasterSource, ensure_band};
use crate::types::{Extent, StretchBounds};

/// Histogram resolution used by the stretch panel
pub const DEFAULT_BINS: usize = 256;

/// Pixels read per estimate unless told otherwise
pub const DEFAULT_SAMPLE_SIZE: usize = 250_000;

/// Fail unless `0 <= lower < upper <= scale` with finite cuts
pub fn validate_cuts(lower: f64, upper: f64, scale: f64) -> Result<()> {
    let ok = lower.is_finite()
        && upper.is_finite()
        && lower >= 0.0
        && upper <= scale
        && lower < upper;
    if !ok {
        return Err(Error::InvalidPercentiles {
            lower,
            upper,
            scale,
        });
    }
    Ok(())
}

/// Which band, which cuts (in percent), and how finely to sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileRequest {
    /// 1-based band index
    pub band: usize,
    pub lower_pct: f64,
    pub upper_pct: f64,
    pub bins: usize,
    /// Null extent means the whole raster
    pub extent: Extent,
    /// Maximum pixels read; 0 reads all
    pub sample_size: usize,
}

impl Default for PercentileRequest {
    fn default() -> Self {
        Self {
            band: 1,
            lower_pct: 2.0,
            upper_pct: 98.0,
            bins: DEFAULT_BINS,
            extent: Extent::default(),
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl PercentileRequest {
    pub fn new(band: usize, lower_pct: f64, upper_pct: f64) -> Self {
        Self {
            band,
            lower_pct,
            upper_pct,
            ..Self::default()
        }
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Check the preconditions that do not depend on the raster
    pub fn validate(&self) -> Result<()> {
        validate_cuts(self.lower_pct, self.upper_pct, 100.0)?;
        if self.bins == 0 {
            return Err(Error::InvalidBinCount { bins: self.bins });
        }
        if self.band == 0 {
            return Err(Error::InvalidBand {
                band: self.band,
                count: 0,
            });
        }
        Ok(())
    }
}

/// Bounds at `lower_pct`/`upper_pct` of a histogram; `None` when it is empty
pub fn bounds_from_histogram(
    hist: &Histogram,
    lower_pct: f64,
    upper_pct: f64,
) -> Result<Option<StretchBounds>> {
    validate_cuts(lower_pct, upper_pct, 100.0)?;
    let low = hist.value_at_fraction(lower_pct / 100.0);
    let high = hist.value_at_fraction(upper_pct / 100.0);
    Ok(match (low, high) {
        (Some(low), Some(high)) => Some(StretchBounds { low, high }),
        _ => None,
    })
}

/// Percentile cut values of a band, estimated from a `bins`-bin histogram.
///
/// Nodata is the active override from `nodata_override`, else the band's
/// declared value. Returns `Ok(None)` when the extent holds no valid pixel.
pub fn percentile_from_hist<R: RasterSource + ?Sized>(
    source: &R,
    request: &PercentileRequest,
    nodata_override: &NodataOverride,
) -> Result<Option<StretchBounds>> {
    request.validate()?;
    ensure_band(source, request.band)?;

    let nodata = nodata_override.resolve(source.nodata(request.band));
    let hist = Histogram::for_band(
        source,
        request.band,
        &request.extent,
        request.bins,
        request.sample_size,
        nodata,
    )?;
    if hist.is_empty() {
        info!(
            "Band {}: no valid pixels in extent {} (nodata={:?}); nothing to stretch",
            request.band, request.extent, nodata
        );
        return Ok(None);
    }

    let bounds = bounds_from_histogram(&hist, request.lower_pct, request.upper_pct)?;
    if let Some(b) = bounds {
        info!(
            "Band {}: {}%..{}% cut -> [{:.6}, {:.6}] ({} samples, bin width {:.6})",
            request.band,
            request.lower_pct,
            request.upper_pct,
            b.low,
            b.high,
            hist.total(),
            hist.bin_width()
        );
    }
    Ok(bounds)
}

/// Linearly interpolated empirical quantile of sorted values, `q` in [0, 1]
fn sorted_quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let idx = q * (n - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let w = idx - lo as f64;
        sorted[lo] * (1.0 - w) + sorted[hi] * w
    }
}

/// Exact cumulative cut: sorts the valid sampled values and reads the
/// quantiles at `lower_frac`/`upper_frac` (fractions, e.g. 0.02 and 0.98).
///
/// `nodata` is used as given. Returns `Ok(None)` when no valid values exist.
pub fn cumulative_cut<R: RasterSource + ?Sized>(
    source: &R,
    band: usize,
    lower_frac: f64,
    upper_frac: f64,
    extent: &Extent,
    sample_size: usize,
    nodata: Option<f64>,
) -> Result<Option<StretchBounds>> {
    validate_cuts(lower_frac, upper_frac, 1.0)?;
    let sample = sample_band(source, band, extent, sample_size)?;

    let mut values: Vec<f64> = sample
        .iter()
        .copied()
        .filter(|&v| is_valid_sample(v, nodata))
        .collect();
    if values.is_empty() {
        return Ok(None);
    }
    values.sort_unstable_by(f64::total_cmp);

    let bounds = StretchBounds {
        low: sorted_quantile(&values, lower_frac),
        high: sorted_quantile(&values, upper_frac),
    };
    debug!(
        "Cumulative cut band {}: {} values -> [{}, {}]",
        band,
        values.len(),
        bounds.low,
        bounds.high
    );
    Ok(Some(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemRaster;
    use ndarray::Array2;

    fn ramp(rows: usize, cols: usize) -> MemRaster {
        let data = Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64);
        MemRaster::new(data, Some(0.0))
    }

    #[test]
    fn validates_cut_ordering_and_range() {
        assert!(validate_cuts(2.0, 98.0, 100.0).is_ok());
        assert!(validate_cuts(0.0, 100.0, 100.0).is_ok());
        for (lo, hi) in [(98.0, 2.0), (50.0, 50.0), (-1.0, 50.0), (2.0, 101.0), (f64::NAN, 5.0)] {
            assert!(
                matches!(validate_cuts(lo, hi, 100.0), Err(Error::InvalidPercentiles { .. })),
                "{} {}",
                lo,
                hi
            );
        }
        assert!(validate_cuts(0.02, 0.98, 1.0).is_ok());
        assert!(validate_cuts(2.0, 98.0, 1.0).is_err());
    }

    #[test]
    fn request_preconditions_fail_fast() {
        let raster = ramp(4, 4);
        let none = NodataOverride::disabled();

        let bad_order = PercentileRequest::new(1, 90.0, 10.0);
        assert!(matches!(
            percentile_from_hist(&raster, &bad_order, &none),
            Err(Error::InvalidPercentiles { .. })
        ));

        let zero_bins = PercentileRequest::new(1, 2.0, 98.0).with_bins(0);
        assert!(matches!(
            percentile_from_hist(&raster, &zero_bins, &none),
            Err(Error::InvalidBinCount { bins: 0 })
        ));

        let bad_band = PercentileRequest::new(2, 2.0, 98.0);
        assert!(matches!(
            percentile_from_hist(&raster, &bad_band, &none),
            Err(Error::InvalidBand { band: 2, count: 1 })
        ));
        let band_zero = PercentileRequest::new(0, 2.0, 98.0);
        assert!(matches!(
            percentile_from_hist(&raster, &band_zero, &none),
            Err(Error::InvalidBand { band: 0, .. })
        ));
    }

    #[test]
    fn full_range_cut_spans_min_to_max() {
        let raster = ramp(16, 16);
        let req = PercentileRequest::new(1, 0.0, 100.0);
        let b = percentile_from_hist(&raster, &req, &NodataOverride::disabled())
            .unwrap()
            .unwrap();
        assert_eq!(b.low, 1.0);
        assert_eq!(b.high, 255.0);
    }

    #[test]
    fn matches_reference_within_one_bin() {
        let raster = ramp(64, 64);
        let req = PercentileRequest::new(1, 5.0, 95.0).with_bins(64);
        let b = percentile_from_hist(&raster, &req, &NodataOverride::disabled())
            .unwrap()
            .unwrap();
        let r = cumulative_cut(&raster, 1, 0.05, 0.95, &Extent::default(), 0, Some(0.0))
            .unwrap()
            .unwrap();
        let tol = (r.high - r.low) / 64.0 + 1e-6;
        assert!((b.low - r.low).abs() <= tol, "{:?} vs {:?}", b, r);
        assert!((b.high - r.high).abs() <= tol, "{:?} vs {:?}", b, r);
    }

    #[test]
    fn all_nodata_gives_none() {
        let raster = MemRaster::new(Array2::from_elem((8, 8), -1.0), Some(-1.0));
        let req = PercentileRequest::default();
        assert_eq!(
            percentile_from_hist(&raster, &req, &NodataOverride::disabled()).unwrap(),
            None
        );
        assert_eq!(
            cumulative_cut(&raster, 1, 0.02, 0.98, &Extent::default(), 0, Some(-1.0)).unwrap(),
            None
        );
    }

    #[test]
    fn sorted_quantile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sorted_quantile(&v, 0.0), 1.0);
        assert_eq!(sorted_quantile(&v, 0.5), 3.0);
        assert_eq!(sorted_quantile(&v, 1.0), 5.0);
        assert!((sorted_quantile(&v, 0.1) - 1.4).abs() < 1e-12);
        assert_eq!(sorted_quantile(&[7.0], 0.3), 7.0);
    }
}
