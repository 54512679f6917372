use ndarray::{Array2, Zip};
use tracing::debug;

use crate::core::histogram::is_valid_sample;
use crate::types::{BitDepth, StretchBounds};

/// Stretched band samples at the requested bit depth, row-major
#[derive(Debug, Clone, PartialEq)]
pub enum StretchedBand {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl StretchedBand {
    pub fn len(&self) -> usize {
        match self {
            StretchedBand::U8(v) => v.len(),
            StretchedBand::U16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 8-bit view of the band; 16-bit samples are rescaled
    pub fn to_u8(&self) -> Vec<u8> {
        match self {
            StretchedBand::U8(v) => v.clone(),
            StretchedBand::U16(v) => v
                .iter()
                .map(|&x| ((x as f64) * 255.0 / 65535.0).round() as u8)
                .collect(),
        }
    }
}

/// Linear "stretch to min/max" between two cut values, clipping outside them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastStretch {
    pub low: f64,
    pub high: f64,
}

impl From<StretchBounds> for ContrastStretch {
    fn from(b: StretchBounds) -> Self {
        Self {
            low: b.low,
            high: b.high,
        }
    }
}

impl ContrastStretch {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Map one value to `[0, 1]`; `None` for nodata and non-finite values
    #[inline]
    pub fn normalize(&self, v: f64, nodata: Option<f64>) -> Option<f64> {
        if !is_valid_sample(v, nodata) {
            return None;
        }
        let range = self.high - self.low;
        if range <= 0.0 {
            return Some(0.0);
        }
        Some((v.clamp(self.low, self.high) - self.low) / range)
    }

    fn scaled(&self, data: &Array2<f64>, nodata: Option<f64>, max_out: f64) -> Array2<f64> {
        Zip::from(data).par_map_collect(|&v| match self.normalize(v, nodata) {
            Some(t) => (t * max_out).round().clamp(0.0, max_out),
            None => 0.0,
        })
    }

    /// Stretch a band to `bit_depth`; nodata and non-finite pixels become 0
    pub fn apply(
        &self,
        data: &Array2<f64>,
        nodata: Option<f64>,
        bit_depth: BitDepth,
    ) -> StretchedBand {
        let scaled = self.scaled(data, nodata, bit_depth.max_value());
        debug!(
            "Stretch [{}, {}] -> {:?} over {}x{}",
            self.low,
            self.high,
            bit_depth,
            data.ncols(),
            data.nrows()
        );
        match bit_depth {
            BitDepth::U8 => StretchedBand::U8(scaled.iter().map(|&v| v as u8).collect()),
            BitDepth::U16 => StretchedBand::U16(scaled.iter().map(|&v| v as u16).collect()),
        }
    }
}
