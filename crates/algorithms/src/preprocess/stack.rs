//! Per-cell mean of a stack of co-registered layers
//!
//! Used to collapse a time series (e.g. monthly SST) into one field before
//! reclassification.

use ndarray::Array2;
use crate::maybe_rayon::*;
use aquasuit_core::raster::Raster;
use aquasuit_core::{Error, Result};

/// Mean of `layers`, cell by cell.
///
/// No-data cells of a layer are skipped; a cell is no-data (NaN) in the
/// output only when it is no-data in every layer. All layers must share the
/// first layer's grid.
pub fn stack_mean(layers: &[Raster<f64>]) -> Result<Raster<f64>> {
    let first = layers.first().ok_or_else(|| Error::InvalidParameter {
        name: "layers",
        value: "[]".into(),
        reason: "at least one layer is required".into(),
    })?;

    for (i, layer) in layers.iter().enumerate().skip(1) {
        first.check_aligned(layer, &format!("layer {}", i))?;
    }

    let (rows, cols) = first.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let mut sum = 0.0;
                let mut count = 0usize;
                for layer in layers {
                    let v = layer.data()[(row, col)];
                    if !layer.is_nodata(v) {
                        sum += v;
                        count += 1;
                    }
                }
                if count > 0 {
                    *out = sum / count as f64;
                }
            }
            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    let mut output = first.with_data(array)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}
