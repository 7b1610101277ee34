//! Nearest-neighbour resampling onto a template grid
//!
//! Brings a field with a different resolution or extent (typically
//! bathymetry) onto the grid of the reference field so the two can be
//! evaluated cell by cell. Resampling onto a smaller template crops.

use ndarray::Array2;
use crate::maybe_rayon::*;
use aquasuit_core::raster::{Raster, RasterElement};
use aquasuit_core::{Error, Result, CRS};

/// Resample `src` onto the grid of `template`.
///
/// Each output cell takes the value of the source cell containing its
/// centre. Cells whose centre falls outside `src`, or on a no-data source
/// cell, are NaN. Both rasters must use the same CRS (or both have none);
/// reprojection is not performed.
pub fn resample_nearest<T: RasterElement>(src: &Raster<f64>, template: &Raster<T>) -> Result<Raster<f64>> {
    match (template.crs(), src.crs()) {
        (None, None) => {}
        (Some(a), Some(b)) if a.is_equivalent(b) => {}
        (a, b) => {
            return Err(Error::CrsMismatch {
                variable: "resample source".into(),
                expected: a.map_or_else(|| "none".to_string(), CRS::identifier),
                actual: b.map_or_else(|| "none".to_string(), CRS::identifier),
            })
        }
    }

    let (rows, cols) = template.shape();
    let (src_rows, src_cols) = src.shape();
    let src_tf = src.transform();
    let src_data = src.data();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let (x, y) = template.cell_center(row, col);
                let (sc, sr) = src_tf.geo_to_pixel(x, y);
                if !(sc >= 0.0 && sr >= 0.0) {
                    continue;
                }
                let (sc, sr) = (sc.floor() as usize, sr.floor() as usize);
                if sr >= src_rows || sc >= src_cols {
                    continue;
                }
                let v = src_data[(sr, sc)];
                if !src.is_nodata(v) {
                    *out = v;
                }
            }
            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    let mut output = template.with_data(array)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}
