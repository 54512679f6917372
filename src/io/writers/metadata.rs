use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// Sidecar path for an output image: `<output>.json` (e.g. `stretch.tiff.json`)
pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}

/// Write a pretty-printed JSON sidecar describing how an output was produced
pub fn write_json_sidecar<T: Serialize>(output: &Path, metadata: &T) -> Result<PathBuf> {
    let path = sidecar_path(output);
    let json = serde_json::to_string_pretty(metadata)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
