use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use jpeg_encoder::{ColorType, Encoder};

use crate::error::{Error, Result};

/// Largest side a baseline JPEG can carry
const MAX_JPEG_SIDE: usize = u16::MAX as usize;

/// Write an 8-bit grayscale preview
pub fn write_gray_jpeg(output: &Path, cols: usize, rows: usize, data: &[u8]) -> Result<()> {
    if cols > MAX_JPEG_SIDE || rows > MAX_JPEG_SIDE {
        return Err(Error::InvalidArgument {
            arg: "jpeg size",
            value: format!("{}x{}", cols, rows),
        });
    }
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, 95);
    encoder
        .encode(data, cols as u16, rows as u16, ColorType::Luma)
        .map_err(Error::external)?;
    Ok(())
}
