#![doc = r#"
rasterstretch: percentile contrast stretching for raster bands.

This crate computes percentile cut values ("min/max" for a contrast stretch) of a
raster band from a binned histogram, with an optional manual nodata override and an
optional map extent restricting which pixels are considered. It can apply the stretch
and write 8/16-bit GeoTIFF or JPEG previews, provides a headless click-drag extent
picker for interactive hosts, and packages plugin directories into zip archives.

Stability
---------
The public library API is experimental in initial releases and may evolve as the
crate stabilizes. Breaking changes can occur.

Requirements
------------
- Rust 2024 edition toolchain.
- With the `gdal` feature: GDAL development headers and runtime on your system.
  Without it, GeoTIFF files are read through the pure-Rust `tiff` decoder.

Add dependency
--------------
```toml
[dependencies]
rasterstretch = "0.1"
```

Quick start: percentile bounds of an in-memory band
---------------------------------------------------
```rust
use ndarray::Array2;
use rasterstretch::{
    percentile_from_hist, MemRaster, NodataOverride, PercentileRequest,
};

fn main() -> rasterstretch::Result<()> {
    let data = Array2::from_shape_fn((64, 64), |(r, c)| (r * 64 + c) as f64);
    let raster = MemRaster::new(data, None);

    let request = PercentileRequest::new(1, 2.0, 98.0).with_bins(256);
    let bounds = percentile_from_hist(&raster, &request, &NodataOverride::disabled())?;

    if let Some(b) = bounds {
        println!("stretch between {} and {}", b.low, b.high);
    }
    Ok(())
}
```

Restrict to an extent and override nodata
-----------------------------------------
```rust,no_run
use std::path::Path;
use rasterstretch::{percentiles_for_path, Extent, NodataOverride, StretchParams};

fn main() -> rasterstretch::Result<()> {
    let params = StretchParams {
        band: 1,
        lower_pct: 1.0,
        upper_pct: 99.0,
        nodata_override: NodataOverride::enabled("-9999"),
        ..StretchParams::default()
    };
    let extent = Extent::new(500_000.0, 4_100_000.0, 510_000.0, 4_110_000.0);

    match percentiles_for_path(Path::new("/data/dem.tif"), &params, extent)? {
        Some(b) => println!("{} {}", b.low, b.high),
        None => println!("no data in extent"),
    }
    Ok(())
}
```

Stretch a file to disk
----------------------
```rust,no_run
use std::path::Path;
use rasterstretch::{stretch_raster_to_path, BitDepth, OutputFormat, StretchParams};

fn main() -> rasterstretch::Result<()> {
    let params = StretchParams {
        format: OutputFormat::JPEG,
        bit_depth: BitDepth::U8,
        ..StretchParams::default()
    };
    let report = stretch_raster_to_path(
        Path::new("/data/scene.tif"),
        Path::new("/out/scene.jpg"),
        &params,
    )?;
    println!("bounds: {:?}", report.bounds);
    Ok(())
}
```

Batch helpers
-------------
```rust,no_run
use std::path::Path;
use rasterstretch::{stretch_directory_to_path, StretchParams};

fn main() -> rasterstretch::Result<()> {
    let report = stretch_directory_to_path(
        Path::new("/data/tiles"),
        Path::new("/out"),
        &StretchParams::default(),
        true, // continue_on_error
    )?;
    println!("processed={} skipped={} errors={}", report.processed, report.skipped, report.errors);
    Ok(())
}
```

Error handling
--------------
All public functions return `rasterstretch::Result<T>`; match on `rasterstretch::Error`
to handle specific cases.

```rust
use ndarray::Array2;
use rasterstretch::{percentile_from_hist, Error, MemRaster, NodataOverride, PercentileRequest};

let raster = MemRaster::new(Array2::zeros((4, 4)), None);
let request = PercentileRequest::new(3, 2.0, 98.0);
match percentile_from_hist(&raster, &request, &NodataOverride::disabled()) {
    Err(Error::InvalidBand { band, count }) => eprintln!("band {band} of {count}"),
    Err(other) => eprintln!("other error: {other}"),
    Ok(bounds) => println!("{bounds:?}"),
}
```

Feature flags
-------------
- `gdal`: read every GDAL-supported raster format through the `gdal` crate.
- `full`: enables a complete feature set for typical end-to-end workflows.

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points.
- [`core`]: histogram, percentile, nodata and stretch primitives.
- [`io`]: raster sources and output writers.
- [`tools`]: the headless extent picker.
- [`package`]: plugin zip packaging.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod package;
pub mod tools;
pub mod types;

// Curated public API surface
// Types
pub use self::core::params::StretchParams;
pub use error::{Error, Result};
pub use types::{BitDepth, Extent, MapPoint, OutputFormat, StretchBounds};

// Algorithms
pub use self::core::histogram::Histogram;
pub use self::core::nodata::NodataOverride;
pub use self::core::percentile::{PercentileRequest, cumulative_cut, percentile_from_hist};
pub use self::core::stretch::{ContrastStretch, StretchedBand};

// Readers
#[cfg(feature = "gdal")]
pub use io::{GdalError, GdalMetadata, GdalRaster};
pub use io::{MemRaster, RasterSource, TiffRaster, Window, open_raster};

// Tools
pub use package::package_plugin;
pub use tools::{ExtentPicker, PickOutcome, PickerMode, ToolInput};

// High-level API re-exports
pub use api::{
    BatchReport, StretchReport, StretchedImage, compute_percentiles, iterate_rasters,
    percentiles_for_path, stretch_directory_to_path, stretch_raster_to_path,
    stretch_source_to_path, stretch_to_buffer,
};
