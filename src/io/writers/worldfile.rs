use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::GeoTransform;

/// World file path next to an image: `.tfw` for TIFF, `.jgw` for JPEG, `.wld` otherwise
pub fn world_file_path(output_image: &Path) -> PathBuf {
    let ext = output_image
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let world_ext = match ext.as_str() {
        "jpg" | "jpeg" => "jgw",
        "tif" | "tiff" => "tfw",
        _ => "wld",
    };
    output_image.with_extension(world_ext)
}

/// Write a world file next to the raster image using the provided geotransform.
/// The world file stores the transform in pixel-center convention.
pub fn write_world_file(output_image: &Path, geotransform: GeoTransform) -> Result<PathBuf> {
    let world_path = world_file_path(output_image);

    // A, D, B, E, then C, F at the center of the upper-left pixel
    let a = geotransform[1];
    let d = geotransform[4];
    let b = geotransform[2];
    let e = geotransform[5];
    let c = geotransform[0] + 0.5 * a + 0.5 * b;
    let f = geotransform[3] + 0.5 * d + 0.5 * e;

    let mut file = File::create(&world_path)?;
    for value in [a, d, b, e, c, f] {
        writeln!(file, "{:.12}", value)?;
    }
    Ok(world_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_file_uses_pixel_centre_origin() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("out.jpg");
        let path = write_world_file(&image, [100.0, 2.0, 0.0, 50.0, 0.0, -2.0]).unwrap();
        assert_eq!(path, dir.path().join("out.jgw"));

        let text = std::fs::read_to_string(path).unwrap();
        let values: Vec<f64> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(values, vec![2.0, 0.0, 0.0, -2.0, 101.0, 49.0]);
    }

    #[test]
    fn world_file_extension_follows_image() {
        assert_eq!(world_file_path(Path::new("a/b.TIFF")), Path::new("a/b.tfw"));
        assert_eq!(world_file_path(Path::new("a/b.png")), Path::new("a/b.wld"));
    }
}
