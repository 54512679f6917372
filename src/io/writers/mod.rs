//! Output writers: GeoTIFF (`tiff`), grayscale JPEG previews, world files
//! and JSON sidecars.
pub mod jpeg;
pub mod metadata;
pub mod tiff;
pub mod worldfile;
