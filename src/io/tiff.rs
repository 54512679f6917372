//! Pure-Rust GeoTIFF reader built on the `tiff` crate.
//!
//! Reads the first image of a (Geo)TIFF file into memory as `f64` bands.
//! Georeferencing comes from the `ModelPixelScale`/`ModelTiepoint` tags and
//! the declared nodata from GDAL's `GDAL_NODATA` ASCII tag, so files written
//! by GDAL (or by [`crate::io::writers::tiff`]) keep their nodata.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::raster::{RasterSource, Window, ensure_band, read_loaded_window};
use crate::types::{GeoTransform, PIXEL_GEOTRANSFORM};

pub(crate) const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub(crate) const TAG_MODEL_TIEPOINT: u16 = 33922;
pub(crate) const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
pub(crate) const TAG_GDAL_NODATA: u16 = 42113;

/// GeoTIFF raster loaded into memory
#[derive(Debug, Clone)]
pub struct TiffRaster {
    bands: Vec<Array2<f64>>,
    nodata: Option<f64>,
    geotransform: GeoTransform,
}

/// Parse the `GDAL_NODATA` tag text (GDAL writes e.g. "0", "-9999", "nan")
pub(crate) fn parse_gdal_nodata(text: &str) -> Option<f64> {
    text.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .parse::<f64>()
        .ok()
}

fn samples_to_f64(result: DecodingResult) -> Result<Vec<f64>> {
    let values = match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedFormat(
                "TIFF sample type not supported".into(),
            ));
        }
    };
    Ok(values)
}

fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    let scale = decoder.find_tag(Tag::from_u16_exhaustive(TAG_MODEL_PIXEL_SCALE))?;
    let tiepoint = decoder.find_tag(Tag::from_u16_exhaustive(TAG_MODEL_TIEPOINT))?;
    let (Some(scale), Some(tiepoint)) = (scale, tiepoint) else {
        return Ok(PIXEL_GEOTRANSFORM);
    };
    let scale = scale.into_f64_vec()?;
    let tiepoint = tiepoint.into_f64_vec()?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Ok(PIXEL_GEOTRANSFORM);
    }
    // Tiepoint maps raster (i, j) to model (x, y)
    let (sx, sy) = (scale[0], scale[1]);
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    Ok([x - i * sx, sx, 0.0, y + j * sy, 0.0, -sy])
}

impl TiffRaster {
    /// Open and decode the first image of a TIFF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut decoder = Decoder::new(BufReader::new(file))?;
        let (width, height) = decoder.dimensions()?;
        let (cols, rows) = (width as usize, height as usize);

        let samples = match decoder.find_tag(Tag::SamplesPerPixel)? {
            Some(v) => v.into_u16()? as usize,
            None => 1,
        };
        if let Some(planar) = decoder.find_tag(Tag::PlanarConfiguration)? {
            if planar.into_u16()? == 2 {
                return Err(Error::UnsupportedFormat(
                    "planar (band-separate) TIFF layout".into(),
                ));
            }
        }

        let nodata = match decoder.find_tag(Tag::from_u16_exhaustive(TAG_GDAL_NODATA))? {
            Some(v) => parse_gdal_nodata(&v.into_string()?),
            None => None,
        };
        let geotransform = read_geotransform(&mut decoder)?;

        let values = samples_to_f64(decoder.read_image()?)?;
        if samples == 0 || values.len() != cols * rows * samples {
            return Err(Error::UnsupportedFormat(format!(
                "expected {} samples for {}x{}x{}, decoded {}",
                cols * rows * samples,
                cols,
                rows,
                samples,
                values.len()
            )));
        }

        let bands = (0..samples)
            .map(|b| {
                Array2::from_shape_fn((rows, cols), |(r, c)| {
                    values[(r * cols + c) * samples + b]
                })
            })
            .collect();

        debug!(
            "Opened TIFF {:?}: {}x{}, {} band(s), nodata={:?}",
            path.as_ref(),
            cols,
            rows,
            samples,
            nodata
        );

        Ok(Self {
            bands,
            nodata,
            geotransform,
        })
    }
}

impl RasterSource for TiffRaster {
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

    /// GDAL_NODATA applies to every band of the image
    fn nodata(&self, _band: usize) -> Option<f64> {
        self.nodata
    }

    fn read_window(
        &self,
        band: usize,
        window: Window,
        buffer: (usize, usize),
    ) -> Result<Array2<f64>> {
        ensure_band(self, band)?;
        read_loaded_window(&self.bands[band - 1], window, buffer)
    }
}
