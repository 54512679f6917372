//! High-level, ergonomic library API: compute percentile bounds for a raster
//! file or source, stretch a band to an image on disk or in memory, and batch
//! over directories. Prefer these entrypoints over the low-level `core`
//! modules when integrating rasterstretch.
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::core::params::StretchParams;
use crate::core::percentile::percentile_from_hist;
use crate::core::sample::sample_band;
use crate::core::stretch::{ContrastStretch, StretchedBand};
use crate::error::{Error, Result};
use crate::io::raster::RasterSource;
use crate::io::writers::jpeg::write_gray_jpeg;
use crate::io::writers::metadata::write_json_sidecar;
use crate::io::writers::tiff::{write_tiff_u8, write_tiff_u16};
use crate::io::writers::worldfile::write_world_file;
use crate::io::{is_tiff_path, open_raster};
use crate::types::{BitDepth, Extent, OutputFormat, PIXEL_GEOTRANSFORM, StretchBounds};

/// Percentile bounds of `params.band` over `extent` (null extent: whole raster)
pub fn compute_percentiles<R: RasterSource + ?Sized>(
    source: &R,
    params: &StretchParams,
    extent: Extent,
) -> Result<Option<StretchBounds>> {
    percentile_from_hist(source, &params.request(extent), &params.nodata_override)
}

/// Open `input` and compute its percentile bounds
pub fn percentiles_for_path(
    input: &Path,
    params: &StretchParams,
    extent: Extent,
) -> Result<Option<StretchBounds>> {
    let source = open_raster(input)?;
    compute_percentiles(source.as_ref(), params, extent)
}

/// Result of in-memory stretching
#[derive(Debug, Clone)]
pub struct StretchedImage {
    pub width: usize,
    pub height: usize,
    pub bit_depth: BitDepth,
    pub bounds: StretchBounds,
    pub data: StretchedBand,
}

/// Stretch the whole band between its percentile bounds (no disk I/O).
/// `Ok(None)` when the band has no valid pixel.
pub fn stretch_to_buffer<R: RasterSource + ?Sized>(
    source: &R,
    params: &StretchParams,
) -> Result<Option<StretchedImage>> {
    let Some(bounds) = compute_percentiles(source, params, Extent::default())? else {
        return Ok(None);
    };
    let band = sample_band(source, params.band, &Extent::default(), 0)?;
    let nodata = params.nodata_override.resolve(source.nodata(params.band));
    let data = ContrastStretch::from(bounds).apply(&band, nodata, params.bit_depth);
    Ok(Some(StretchedImage {
        width: band.ncols(),
        height: band.nrows(),
        bit_depth: params.bit_depth,
        bounds,
        data,
    }))
}

/// What a stretch run did; also written as the output's JSON sidecar
#[derive(Debug, Clone, Serialize)]
pub struct StretchReport {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub band: usize,
    pub lower_pct: f64,
    pub upper_pct: f64,
    pub bins: usize,
    pub nodata: Option<f64>,
    /// `None` when there was no data to stretch
    pub bounds: Option<StretchBounds>,
    pub width: usize,
    pub height: usize,
    pub format: OutputFormat,
    pub bit_depth: BitDepth,
    pub generated_at: String,
}

/// Stretch a raster source into an image file at `output`.
///
/// Writes the image (TIFF, or 8-bit JPEG preview), a world file for
/// georeferenced JPEGs, and a `<output>.json` sidecar. Nothing is written
/// when the band has no valid pixel; the report then has `bounds: None`.
pub fn stretch_source_to_path<R: RasterSource + ?Sized>(
    source: &R,
    output: &Path,
    params: &StretchParams,
) -> Result<StretchReport> {
    write_stretch(source, None, output, params)
}

fn write_stretch<R: RasterSource + ?Sized>(
    source: &R,
    input: Option<&Path>,
    output: &Path,
    params: &StretchParams,
) -> Result<StretchReport> {
    let (cols, rows) = source.size();
    let mut report = StretchReport {
        input: input.map(Path::to_path_buf),
        output: None,
        band: params.band,
        lower_pct: params.lower_pct,
        upper_pct: params.upper_pct,
        bins: params.bins,
        nodata: params.nodata_override.resolve(source.nodata(params.band)),
        bounds: None,
        width: cols,
        height: rows,
        format: params.format,
        bit_depth: params.bit_depth,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    let Some(image) = stretch_to_buffer(source, params)? else {
        warn!("No valid pixels in band {}; nothing written", params.band);
        return Ok(report);
    };
    report.bounds = Some(image.bounds);

    let gt = source.geotransform();
    let georef = (gt != PIXEL_GEOTRANSFORM).then_some(gt);
    match params.format {
        OutputFormat::TIFF => match &image.data {
            StretchedBand::U8(v) => write_tiff_u8(output, image.width, image.height, v, georef)?,
            StretchedBand::U16(v) => {
                write_tiff_u16(output, image.width, image.height, v, georef, None)?
            }
        },
        OutputFormat::JPEG => {
            if image.bit_depth == BitDepth::U16 {
                warn!("JPEG output is 8-bit; writing U8 preview");
                report.bit_depth = BitDepth::U8;
            }
            write_gray_jpeg(output, image.width, image.height, &image.data.to_u8())?;
            if let Some(gt) = georef {
                write_world_file(output, gt)?;
            }
        }
    }
    report.output = Some(output.to_path_buf());
    write_json_sidecar(output, &report)?;
    info!(
        "Stretched band {} [{}, {}] -> {:?}",
        params.band, image.bounds.low, image.bounds.high, output
    );
    Ok(report)
}

/// Open `input` and stretch it into `output`
pub fn stretch_raster_to_path(
    input: &Path,
    output: &Path,
    params: &StretchParams,
) -> Result<StretchReport> {
    let source = open_raster(input)?;
    write_stretch(source.as_ref(), Some(input), output, params)
}

/// Summary of batch processing over a directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// TIFF files directly inside `input_dir`, sorted by name
pub fn iterate_rasters(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() && is_tiff_path(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter())
}

/// Stretch every TIFF in `input_dir` into `output_dir`.
/// With `continue_on_error`, failures are counted and processing goes on;
/// otherwise the first error is returned. Rasters without valid pixels count
/// as skipped.
pub fn stretch_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    params: &StretchParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    if !input_dir.is_dir() {
        return Err(Error::NotADirectory(input_dir.to_path_buf()));
    }
    std::fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();
    for path in iterate_rasters(input_dir)? {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "raster".to_string());
        let output_path = output_dir.join(format!("{}.{}", stem, params.format.extension()));
        info!("Processing: {:?} -> {:?}", path, output_path);

        match stretch_raster_to_path(&path, &output_path, params) {
            Ok(r) if r.bounds.is_some() => report.processed += 1,
            Ok(_) => report.skipped += 1,
            Err(e) => {
                report.errors += 1;
                warn!("Error processing {:?}: {}", path, e);
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}
