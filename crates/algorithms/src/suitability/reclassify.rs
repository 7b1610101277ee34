//! Per-variable reclassification into a binary suitability mask

use ndarray::Array2;
use crate::maybe_rayon::*;
use aquasuit_core::raster::Raster;
use aquasuit_core::{Error, Result};

use super::range::ToleranceRange;
use super::{SUITABLE, UNSUITABLE};

/// Classify every cell of `field` against a tolerance range.
///
/// A cell becomes [`SUITABLE`] when its value is valid and
/// `range.min() <= value < range.max()`; everything else, including NaN and
/// the field's no-data sentinel, becomes [`UNSUITABLE`]. The returned mask
/// shares the field's grid and uses `UNSUITABLE` as its no-data value.
///
/// # Example
/// ```ignore
/// let sst_ok = reclassify_range(&sst_celsius, &ToleranceRange::new(11.0, 30.0)?)?;
/// ```
pub fn reclassify_range(field: &Raster<f64>, range: &ToleranceRange) -> Result<Raster<u8>> {
    let (rows, cols) = field.shape();
    let view = field.view();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![UNSUITABLE; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let val = view[(row, col)];
                if field.is_nodata(val) {
                    continue;
                }
                if range.contains(val) {
                    *out = SUITABLE;
                }
            }
            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    let mut mask = field.with_data(array)?;
    mask.set_nodata(Some(UNSUITABLE));
    Ok(mask)
}
