use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::nodata::NodataOverride;
use crate::core::percentile::{DEFAULT_BINS, DEFAULT_SAMPLE_SIZE, PercentileRequest};
use crate::error::{Error, Result};
use crate::types::{BitDepth, Extent, OutputFormat};

/// Stretch parameters suitable for preset files and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StretchParams {
    /// 1-based band index
    pub band: usize,
    pub lower_pct: f64,
    pub upper_pct: f64,
    pub bins: usize,
    /// Maximum pixels read for the histogram; 0 reads all
    pub sample_size: usize,
    pub nodata_override: NodataOverride,
    pub bit_depth: BitDepth,
    pub format: OutputFormat,
}

impl Default for StretchParams {
    fn default() -> Self {
        Self {
            band: 1,
            lower_pct: 2.0,
            upper_pct: 98.0,
            bins: DEFAULT_BINS,
            sample_size: DEFAULT_SAMPLE_SIZE,
            nodata_override: NodataOverride::disabled(),
            bit_depth: BitDepth::U8,
            format: OutputFormat::TIFF,
        }
    }
}

impl StretchParams {
    /// Percentile request for these parameters over `extent`
    pub fn request(&self, extent: Extent) -> PercentileRequest {
        PercentileRequest::new(self.band, self.lower_pct, self.upper_pct)
            .with_bins(self.bins)
            .with_sample_size(self.sample_size)
            .with_extent(extent)
    }

    /// Parse a preset. Comment lines before the JSON object are skipped.
    pub fn from_preset_str(content: &str) -> Result<Self> {
        let json_start = content.find('{').ok_or(Error::InvalidArgument {
            arg: "preset",
            value: "no JSON object found".to_string(),
        })?;
        let params: StretchParams = serde_json::from_str(&content[json_start..])?;
        params.request(Extent::default()).validate()?;
        Ok(params)
    }

    pub fn load_preset(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let params = Self::from_preset_str(&content)?;
        info!("Loaded preset {:?}", path);
        Ok(params)
    }

    /// Preset text: a comment header followed by pretty JSON
    pub fn to_preset_string(&self) -> Result<String> {
        let mut content = String::new();
        content.push_str("// rasterstretch preset\n");
        content.push_str(&format!("// Version: {}\n", env!("CARGO_PKG_VERSION")));
        content.push_str(&format!(
            "// Generated: {}\n\n",
            chrono::Utc::now().to_rfc3339()
        ));
        content.push_str(&serde_json::to_string_pretty(self)?);
        content.push('\n');
        Ok(content)
    }

    pub fn save_preset(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_preset_string()?)?;
        info!("Preset saved to {:?}", path);
        Ok(())
    }
}
