use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use rasterstretch::types::{BitDepth, Extent, OutputFormat};

#[derive(Parser)]
#[command(name = "rasterstretch", version, about = "Percentile contrast stretch for raster bands")]
pub struct CliArgs {
    /// Enable debug logging (RUST_LOG is honoured as well)
    #[arg(long, global = true, default_value_t = false)]
    pub log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the percentile cut values of a band
    Percentiles(PercentilesArgs),
    /// Stretch a band between its percentile cuts and write an image
    Stretch(StretchArgs),
    /// Zip a plugin directory next to itself, without Python caches
    Package(PackageArgs),
}

/// Cut options shared by `percentiles` and `stretch`. Unset options keep the
/// preset (or default) value.
#[derive(Args, Clone, Default)]
pub struct CutArgs {
    /// JSON preset with stretch parameters
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Band index (1-based)
    #[arg(short, long)]
    pub band: Option<usize>,

    /// Lower cut in percent (e.g. 2)
    #[arg(long)]
    pub lower: Option<f64>,

    /// Upper cut in percent (e.g. 98)
    #[arg(long)]
    pub upper: Option<f64>,

    /// Histogram bin count
    #[arg(long)]
    pub bins: Option<usize>,

    /// Maximum number of pixels sampled (0 = all)
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Manual nodata value overriding the band's declared nodata
    #[arg(long)]
    pub nodata: Option<String>,
}

#[derive(Args)]
pub struct PercentilesArgs {
    /// Input raster
    #[arg(short, long)]
    pub input: PathBuf,

    /// Restrict to xmin,ymin,xmax,ymax in raster coordinates
    #[arg(long, allow_hyphen_values = true)]
    pub extent: Option<Extent>,

    /// Print a JSON object instead of "low high"
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub cuts: CutArgs,
}

#[derive(Args)]
pub struct StretchArgs {
    /// Input raster (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory of TIFF files (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output filename (single file mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format (tiff or jpeg)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output bit depth (u8 or u16)
    #[arg(long, value_enum)]
    pub bit_depth: Option<BitDepth>,

    /// Batch mode: continue with other files after an error
    #[arg(long, default_value_t = false)]
    pub batch: bool,

    #[command(flatten)]
    pub cuts: CutArgs,
}

#[derive(Args)]
pub struct PackageArgs {
    /// Plugin directory to zip
    pub plugin_dir: Option<PathBuf>,
}
