//! Conjunction of per-variable suitability masks

use ndarray::Zip;
use aquasuit_core::raster::Raster;
use aquasuit_core::{Error, Result};

use super::UNSUITABLE;

/// Combine masks by elementwise multiplication.
///
/// Because masks hold only `SUITABLE = 1` and `UNSUITABLE = 0`, the product
/// is a logical AND: a single unsuitable variable eliminates the cell. All
/// masks must share the first mask's grid.
pub fn combine_masks(masks: &[Raster<u8>]) -> Result<Raster<u8>> {
    let (first, rest) = masks.split_first().ok_or_else(|| Error::InvalidParameter {
        name: "masks",
        value: "[]".into(),
        reason: "at least one mask is required".into(),
    })?;

    let mut composite = first.clone();
    for (i, mask) in rest.iter().enumerate() {
        first.check_aligned(mask, &format!("mask {}", i + 1))?;
        Zip::from(composite.data_mut())
            .and(mask.data())
            .for_each(|acc, &m| *acc *= m);
    }

    composite.set_nodata(Some(UNSUITABLE));
    Ok(composite)
}
