//! Native GeoTIFF reading/writing
//!
//! Uses the `tiff` crate. Georeferencing is read from and written to the
//! ModelPixelScale / ModelTiepoint tags, and the no-data sentinel from the
//! GDAL_NODATA ASCII tag. On write, the GeoKey directory declares a
//! geographic or projected model (with the EPSG code when known) from the
//! raster's CRS. The CRS is not decoded from GeoKeys on read; callers set it
//! explicitly when they know it.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray32Float, Gray8};
use tiff::encoder::{ImageEncoder, TiffEncoder, TiffKind};
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

// GeoKey ids and values (GeoTIFF 1.1, OGC 19-008r4)
const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;
const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Read the first band of a GeoTIFF file into a Raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T: RasterElement>(data: &[u8]) -> Result<Raster<T>> {
    decode_geotiff(Cursor::new(data))
}

fn tiff_err(context: &str) -> impl Fn(tiff::TiffError) -> Error + '_ {
    move |e| Error::Other(format!("{}: {}", context, e))
}

fn cast_all<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or_else(T::default_nodata))
        .collect()
}

fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader).map_err(tiff_err("TIFF decode error"))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(tiff_err("Cannot read dimensions"))?;
    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(tiff_err("Cannot read image data"))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(buf),
        DecodingResult::F64(buf) => cast_all(buf),
        DecodingResult::U8(buf) => cast_all(buf),
        DecodingResult::U16(buf) => cast_all(buf),
        DecodingResult::U32(buf) => cast_all(buf),
        DecodingResult::I8(buf) => cast_all(buf),
        DecodingResult::I16(buf) => cast_all(buf),
        DecodingResult::I32(buf) => cast_all(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    // Multi-band images decode interleaved; only single-band is supported.
    if data.len() != rows * cols {
        return Err(Error::UnsupportedDataType(format!(
            "expected a single band of {}x{} samples, got {} samples",
            cols,
            rows,
            data.len()
        )));
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_nodata(read_nodata(&mut decoder));

    Ok(raster)
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT)).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

fn read_nodata<T, R>(decoder: &mut Decoder<R>) -> Option<T>
where
    T: RasterElement,
    R: Read + Seek,
{
    let text = decoder.get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA)).ok()?;
    let value: f64 = text.trim_matches(char::from(0)).trim().parse().ok()?;
    num_traits::cast(value)
}

/// Write a Raster to a GeoTIFF file as 32-bit float.
///
/// No-data cells are written as their sentinel; NaN stays NaN.
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = BufWriter::new(File::create(path.as_ref())?);
    encode_f32(raster, file)
}

/// Write a Raster to an in-memory GeoTIFF buffer as 32-bit float
pub fn write_geotiff_to_buffer<T: RasterElement>(raster: &Raster<T>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_f32(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Write a `u8` mask (e.g. a suitability grid) as an 8-bit GeoTIFF
pub fn write_mask_geotiff<P: AsRef<Path>>(mask: &Raster<u8>, path: P) -> Result<()> {
    let file = BufWriter::new(File::create(path.as_ref())?);
    encode_mask(mask, file)
}

fn encode_mask<W: Write + Seek>(mask: &Raster<u8>, writer: W) -> Result<()> {
    let mut encoder = TiffEncoder::new(writer).map_err(tiff_err("TIFF encoder error"))?;
    let (rows, cols) = mask.shape();

    let mut image = encoder
        .new_image::<Gray8>(cols as u32, rows as u32)
        .map_err(tiff_err("Cannot create TIFF image"))?;
    write_geo_tags(&mut image, mask, mask.nodata().map(f64::from))?;

    let data: Vec<u8> = mask.data().iter().copied().collect();
    image
        .write_data(&data)
        .map_err(tiff_err("Cannot write image data"))?;
    Ok(())
}

fn encode_f32<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer).map_err(tiff_err("TIFF encoder error"))?;
    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let nodata = raster.nodata().and_then(RasterElement::to_f64);

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(tiff_err("Cannot create TIFF image"))?;
    write_geo_tags(&mut image, raster, nodata)?;

    image
        .write_data(&data)
        .map_err(tiff_err("Cannot write image data"))?;
    Ok(())
}

/// GeoKey directory for `crs`: version header followed by sorted key entries.
///
/// Without a CRS only the raster type is declared, so readers do not assume
/// a model the data may not be in.
fn geo_key_directory(crs: Option<&CRS>) -> Vec<u16> {
    let mut keys: Vec<[u16; 4]> = Vec::new();

    if let Some(crs) = crs {
        let model = if crs.is_geographic() {
            MODEL_TYPE_GEOGRAPHIC
        } else {
            MODEL_TYPE_PROJECTED
        };
        keys.push([GT_MODEL_TYPE_KEY, 0, 1, model]);
    }
    keys.push([GT_RASTER_TYPE_KEY, 0, 1, RASTER_PIXEL_IS_AREA]);

    if let Some(crs) = crs {
        if let Some(code) = crs.epsg().and_then(|c| u16::try_from(c).ok()) {
            let key = if crs.is_geographic() {
                GEOGRAPHIC_TYPE_KEY
            } else {
                PROJECTED_CS_TYPE_KEY
            };
            keys.push([key, 0, 1, code]);
        }
    }

    let mut dir = vec![1, 1, 0, keys.len() as u16];
    dir.extend(keys.iter().flatten());
    dir
}

fn write_geo_tags<T, W, C, K>(
    image: &mut ImageEncoder<'_, W, C, K>,
    raster: &Raster<T>,
    nodata: Option<f64>,
) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
    C: tiff::encoder::colortype::ColorType,
    K: TiffKind,
{
    let gt = raster.transform();
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])
        .map_err(tiff_err("Cannot write scale tag"))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])
        .map_err(tiff_err("Cannot write tiepoint tag"))?;

    let geokeys = geo_key_directory(raster.crs());
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), &geokeys[..])
        .map_err(tiff_err("Cannot write geokey tag"))?;

    if let Some(nd) = nodata {
        image
            .encoder()
            .write_tag(Tag::Unknown(GDAL_NODATA), nd.to_string().as_str())
            .map_err(tiff_err("Cannot write nodata tag"))?;
    }

    Ok(())
}
