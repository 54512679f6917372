use tracing::info;
use tracing_subscriber::EnvFilter;

use rasterstretch::api::{percentiles_for_path, stretch_directory_to_path, stretch_raster_to_path};
use rasterstretch::core::nodata::NodataOverride;
use rasterstretch::package::package_plugin;
use rasterstretch::StretchParams;

use super::args::{CliArgs, Command, CutArgs, PackageArgs, PercentilesArgs, StretchArgs};
use super::errors::AppError;

const PACKAGE_USAGE: &str = "rasterstretch package <PLUGIN_DIR>  (e.g. rasterstretch package plugins/hello_world)";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        Some(EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().ok()
    };
    if let Some(filter) = filter {
        // A subscriber installed earlier wins
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
    }
}

/// Preset (or defaults) with explicitly given options applied on top
fn resolve_params(cuts: &CutArgs) -> Result<StretchParams, AppError> {
    let mut params = match &cuts.config {
        Some(path) => StretchParams::load_preset(path)?,
        None => StretchParams::default(),
    };
    if let Some(band) = cuts.band {
        params.band = band;
    }
    if let Some(lower) = cuts.lower {
        params.lower_pct = lower;
    }
    if let Some(upper) = cuts.upper {
        params.upper_pct = upper;
    }
    if let Some(bins) = cuts.bins {
        params.bins = bins;
    }
    if let Some(sample_size) = cuts.sample_size {
        params.sample_size = sample_size;
    }
    if let Some(text) = &cuts.nodata {
        params.nodata_override = NodataOverride::enabled(text.clone());
    }
    Ok(params)
}

fn run_percentiles(args: PercentilesArgs) -> Result<(), AppError> {
    let params = resolve_params(&args.cuts)?;
    let extent = args.extent.unwrap_or_default();
    let bounds = percentiles_for_path(&args.input, &params, extent)?;

    if args.json {
        let value = serde_json::json!({
            "input": args.input,
            "band": params.band,
            "lower_pct": params.lower_pct,
            "upper_pct": params.upper_pct,
            "bins": params.bins,
            "low": bounds.map(|b| b.low),
            "high": bounds.map(|b| b.high),
        });
        println!("{}", value);
    } else {
        match bounds {
            Some(b) => println!("{} {}", b.low, b.high),
            None => println!("none none"),
        }
    }
    Ok(())
}

fn run_stretch(args: StretchArgs) -> Result<(), AppError> {
    let mut params = resolve_params(&args.cuts)?;
    if let Some(format) = args.format {
        params.format = format;
    }
    if let Some(bit_depth) = args.bit_depth {
        params.bit_depth = bit_depth;
    }

    let batch_mode = args.batch || args.input_dir.is_some();
    if batch_mode {
        let input_dir = args.input_dir.ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        info!("Starting batch stretch from directory: {:?}", input_dir);
        let report = stretch_directory_to_path(&input_dir, &output_dir, &params, args.batch)?;
        println!(
            "processed={} skipped={} errors={}",
            report.processed, report.skipped, report.errors
        );
    } else {
        let input = args.input.ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let output = args.output.ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?;

        let report = stretch_raster_to_path(&input, &output, &params)?;
        match report.bounds {
            Some(b) => println!("Stretched [{} {}]: {}", b.low, b.high, output.display()),
            None => println!("No data to stretch in band {}", params.band),
        }
    }
    Ok(())
}

fn run_package(args: PackageArgs) -> Result<(), AppError> {
    let plugin_dir = args.plugin_dir.ok_or(AppError::Usage {
        usage: PACKAGE_USAGE.to_string(),
    })?;
    let out = package_plugin(&plugin_dir)?;
    println!("Built: {}", out.display());
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    init_logging(args.log);

    match args.command {
        Command::Percentiles(a) => run_percentiles(a),
        Command::Stretch(a) => run_stretch(a),
        Command::Package(a) => run_package(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterstretch::Extent;

    #[test]
    fn explicit_flags_override_defaults() {
        let cuts = CutArgs {
            band: Some(3),
            upper: Some(99.5),
            nodata: Some("-1".into()),
            ..CutArgs::default()
        };
        let p = resolve_params(&cuts).unwrap();
        assert_eq!(p.band, 3);
        assert_eq!(p.lower_pct, 2.0);
        assert_eq!(p.upper_pct, 99.5);
        assert_eq!(p.nodata_override.resolve(None), Some(-1.0));
    }

    #[test]
    fn package_without_dir_is_usage_error() {
        let err = run_package(PackageArgs { plugin_dir: None }).unwrap_err();
        assert!(matches!(err, AppError::Usage { .. }));
        assert!(err.to_string().starts_with("Usage: rasterstretch package"));
    }

    #[test]
    fn repeated_logging_init_is_harmless() {
        init_logging(true);
        init_logging(true);
        tracing::debug!("still logging");
    }

    #[test]
    fn percentiles_extent_parses() {
        let e: Extent = "0,0,10,10".parse().unwrap();
        assert!(!e.is_empty());
    }
}
