use tracing::debug;

use crate::core::sample::sample_band;
use crate::error::{Error, Result};
use crate::io::raster::RasterSource;
use crate::types::Extent;

/// True when `v` takes part in statistics: finite and not the nodata value
#[inline]
pub fn is_valid_sample(v: f64, nodata: Option<f64>) -> bool {
    match nodata {
        Some(nd) => v.is_finite() && v != nd,
        None => v.is_finite(),
    }
}

/// Fixed-bin count histogram over `[min, max]` of the valid sample values.
///
/// Bin `i` covers `[min + i * w, min + (i + 1) * w)` with `w = (max - min) / bins`;
/// the last bin also holds `max`. When every value is equal the width is zero
/// and all counts sit in bin 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<u64>,
    min: f64,
    max: f64,
}

impl Histogram {
    /// Build a histogram of `bins` bins, skipping nodata and non-finite values.
    ///
    /// Two passes over the values: min/max first, then binning.
    pub fn from_values<'a, I>(values: I, bins: usize, nodata: Option<f64>) -> Result<Self>
    where
        I: IntoIterator<Item = &'a f64>,
        I::IntoIter: Clone,
    {
        if bins == 0 {
            return Err(Error::InvalidBinCount { bins });
        }
        let values = values.into_iter();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut any = false;
        for &v in values.clone() {
            if is_valid_sample(v, nodata) {
                any = true;
                if v < min {
                    min = v;
                }
                if v > max {
                    max = v;
                }
            }
        }

        let mut counts = vec![0u64; bins];
        if !any {
            return Ok(Self {
                counts,
                min: 0.0,
                max: 0.0,
            });
        }

        // Halved so the span stays finite for values near ±f64::MAX
        let half_span = max / 2.0 - min / 2.0;
        for &v in values {
            if !is_valid_sample(v, nodata) {
                continue;
            }
            let idx = if half_span > 0.0 {
                (((v / 2.0 - min / 2.0) / half_span * bins as f64) as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }

        Ok(Self { counts, min, max })
    }

    /// Histogram of `band` over `extent`, read with at most about `sample_size` pixels
    pub fn for_band<R: RasterSource + ?Sized>(
        source: &R,
        band: usize,
        extent: &Extent,
        bins: usize,
        sample_size: usize,
        nodata: Option<f64>,
    ) -> Result<Self> {
        if bins == 0 {
            return Err(Error::InvalidBinCount { bins });
        }
        let sample = sample_band(source, band, extent, sample_size)?;
        let hist = Self::from_values(sample.iter(), bins, nodata)?;
        debug!(
            "Histogram band {}: {} of {} sampled pixels valid, range [{}, {}], {} bins",
            band,
            hist.total(),
            sample.len(),
            hist.min,
            hist.max,
            bins
        );
        Ok(hist)
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Number of valid samples counted
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn bin_width(&self) -> f64 {
        let bins = self.bins() as f64;
        self.max / bins - self.min / bins
    }

    /// Lower edge of bin `index`; `bin_edge(bins())` is `max`
    pub fn bin_edge(&self, index: usize) -> f64 {
        let t = (index as f64 / self.bins() as f64).min(1.0);
        self.min * (1.0 - t) + self.max * t
    }

    /// Running totals: entry `i` counts the samples in bins `0..=i`
    pub fn cumulative(&self) -> Vec<u64> {
        self.counts
            .iter()
            .scan(0u64, |acc, &c| {
                *acc += c;
                Some(*acc)
            })
            .collect()
    }

    /// Value below which about `fraction` of the samples fall.
    ///
    /// Walks the cumulative counts to the first bin that reaches the target
    /// count and interpolates linearly inside it. `None` when empty.
    pub fn value_at_fraction(&self, fraction: f64) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let target = fraction.clamp(0.0, 1.0) * total as f64;
        if target >= total as f64 {
            return Some(self.max);
        }
        let width = self.bin_width();

        let mut before = 0u64;
        for (i, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let after = before + count;
            if after as f64 >= target {
                let within = ((target - before as f64) / count as f64).clamp(0.0, 1.0);
                return Some(self.bin_edge(i) + within * width);
            }
            before = after;
        }
        Some(self.max)
    }
}
