use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;

use crate::error::Result;
use crate::io::tiff::{
    TAG_GDAL_NODATA, TAG_GEO_KEY_DIRECTORY, TAG_MODEL_PIXEL_SCALE, TAG_MODEL_TIEPOINT,
};
use crate::types::GeoTransform;

// GeoKeyDirectory header (version 1.1.0, one key) + GTRasterTypeGeoKey = RasterPixelIsArea
const GEO_KEYS_PIXEL_IS_AREA: [u16; 8] = [1, 1, 0, 1, 1025, 0, 1, 1];

fn write_gray<C>(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[C::Inner],
    geotransform: Option<GeoTransform>,
    nodata: Option<f64>,
) -> Result<()>
where
    C: ColorType,
    [C::Inner]: TiffValue,
{
    let file = File::create(output)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    let mut image = encoder.new_image::<C>(cols as u32, rows as u32)?;

    if let Some(gt) = geotransform {
        let scale = [gt[1], -gt[5], 0.0];
        let tiepoint = [0.0, 0.0, 0.0, gt[0], gt[3], 0.0];
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(TAG_MODEL_PIXEL_SCALE), &scale[..])?;
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(TAG_MODEL_TIEPOINT), &tiepoint[..])?;
        image.encoder().write_tag(
            Tag::from_u16_exhaustive(TAG_GEO_KEY_DIRECTORY),
            &GEO_KEYS_PIXEL_IS_AREA[..],
        )?;
    }
    if let Some(nd) = nodata {
        let text = nd.to_string();
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(TAG_GDAL_NODATA), text.as_str())?;
    }

    image.write_data(data)?;
    Ok(())
}

pub fn write_tiff_u8(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[u8],
    geotransform: Option<GeoTransform>,
) -> Result<()> {
    write_gray::<colortype::Gray8>(output, cols, rows, data, geotransform, None)
}

pub fn write_tiff_u16(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[u16],
    geotransform: Option<GeoTransform>,
    nodata: Option<f64>,
) -> Result<()> {
    write_gray::<colortype::Gray16>(output, cols, rows, data, geotransform, nodata)
}

pub fn write_tiff_f64(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[f64],
    geotransform: Option<GeoTransform>,
    nodata: Option<f64>,
) -> Result<()> {
    write_gray::<colortype::Gray64Float>(output, cols, rows, data, geotransform, nodata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::raster::{RasterSource, Window};
    use crate::io::tiff::TiffRaster;

    #[test]
    fn u16_geotiff_keeps_nodata_and_georeference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.tif");
        let data: Vec<u16> = (0..12).collect();
        let gt = [500_000.0, 10.0, 0.0, 4_200_000.0, 0.0, -10.0];
        write_tiff_u16(&path, 4, 3, &data, Some(gt), Some(0.0)).unwrap();

        let raster = TiffRaster::open(&path).unwrap();
        assert_eq!(raster.size(), (4, 3));
        assert_eq!(raster.band_count(), 1);
        assert_eq!(raster.nodata(1), Some(0.0));
        assert_eq!(raster.geotransform(), gt);
        let band = raster.read_window(1, Window::full((4, 3)), (4, 3)).unwrap();
        assert_eq!(band[(2, 3)], 11.0);
    }

    #[test]
    fn plain_tiff_has_no_nodata_or_georeference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.tif");
        write_tiff_u8(&path, 2, 2, &[1, 2, 3, 4], None).unwrap();

        let raster = TiffRaster::open(&path).unwrap();
        assert_eq!(raster.nodata(1), None);
        assert_eq!(raster.geotransform(), crate::types::PIXEL_GEOTRANSFORM);
    }

    #[test]
    fn float_tiff_round_trips_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.tif");
        let data = [-1.5, 0.25, 3.0, f64::NAN];
        write_tiff_f64(&path, 2, 2, &data, None, Some(f64::NAN)).unwrap();

        let raster = TiffRaster::open(&path).unwrap();
        assert!(raster.nodata(1).is_some_and(f64::is_nan));
        let band = raster.read_window(1, Window::full((2, 2)), (2, 2)).unwrap();
        assert_eq!(band[(0, 0)], -1.5);
        assert_eq!(band[(1, 0)], 3.0);
        assert!(band[(1, 1)].is_nan());
    }
}
