//! Per-cell ground area
//!
//! Counting cells is only a valid area measure on an equal-area grid. On a
//! geographic (lon/lat) grid a cell's ground area shrinks with cos(latitude),
//! so a 0.04° cell covers ~19 km² at the equator and ~10 km² at 60°N.
//!
//! Geographic cells are measured exactly on the WGS84 ellipsoid using the
//! authalic latitude function q(φ) (Snyder 1987, eq. 3-12): the area of the
//! band between latitudes φ1 and φ2 spanning Δλ radians of longitude is
//!
//! ```text
//! A = a² / 2 · Δλ · |q(φ2) − q(φ1)|
//! q(φ) = (1 − e²) · [ sinφ / (1 − e² sin²φ) − 1/(2e) · ln((1 − e sinφ) / (1 + e sinφ)) ]
//! ```
//!
//! Reference:
//! Snyder, J.P. (1987). Map Projections: A Working Manual. USGS PP 1395.

use ndarray::Array2;
use crate::maybe_rayon::*;
use aquasuit_core::raster::{Raster, RasterElement};
use aquasuit_core::{Error, Result, CRS};
use serde::{Deserialize, Serialize};

/// WGS84 ellipsoid parameters
const WGS84_A: f64 = 6_378_137.0; // semi-major axis (m)
const WGS84_F: f64 = 1.0 / 298.257_223_563; // flattening

const M2_PER_KM2: f64 = 1.0e6;

/// How to turn grid cells into ground area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CellAreaMode {
    /// Ellipsoidal when the grid's CRS is geographic, planar metres otherwise
    /// (including when no CRS is set).
    #[default]
    Auto,
    /// Coordinates are degrees of longitude/latitude on WGS84.
    Ellipsoidal,
    /// Coordinates are projected linear units; `metres_per_unit` converts
    /// them to metres (1.0 for metre-based projections).
    Planar { metres_per_unit: f64 },
}

impl CellAreaMode {
    /// Replace `Auto` with the concrete mode implied by `crs`.
    pub fn resolve(self, crs: Option<&CRS>) -> CellAreaMode {
        match self {
            CellAreaMode::Auto => {
                if crs.is_some_and(CRS::is_geographic) {
                    CellAreaMode::Ellipsoidal
                } else {
                    CellAreaMode::Planar { metres_per_unit: 1.0 }
                }
            }
            other => other,
        }
    }
}

/// Authalic latitude function q(φ) for a spheroid of eccentricity `e`.
fn authalic_q(lat_rad: f64, e: f64) -> f64 {
    let s = lat_rad.sin();
    let e2 = e * e;
    let es = e * s;
    (1.0 - e2) * (s / (1.0 - e2 * s * s) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}

/// Exact ellipsoidal area (km²) of the cell bounded by two latitudes and
/// spanning `d_lon_deg` degrees of longitude.
pub fn geographic_cell_area_km2(lat1_deg: f64, lat2_deg: f64, d_lon_deg: f64) -> f64 {
    let e = (2.0 * WGS84_F - WGS84_F * WGS84_F).sqrt();
    let lat1 = lat1_deg.clamp(-90.0, 90.0).to_radians();
    let lat2 = lat2_deg.clamp(-90.0, 90.0).to_radians();
    let dq = (authalic_q(lat2, e) - authalic_q(lat1, e)).abs();
    WGS84_A * WGS84_A / 2.0 * d_lon_deg.to_radians().abs() * dq / M2_PER_KM2
}

/// Compute a raster holding each cell's ground area in km².
///
/// The output shares the input grid. Ellipsoidal mode requires a north-up
/// grid whose latitudes lie within ±90°.
pub fn cell_area_km2<T: RasterElement>(grid: &Raster<T>, mode: CellAreaMode) -> Result<Raster<f64>> {
    let (rows, cols) = grid.shape();
    let tf = *grid.transform();

    let data: Vec<f64> = match mode.resolve(grid.crs()) {
        CellAreaMode::Planar { metres_per_unit } => {
            if !(metres_per_unit.is_finite() && metres_per_unit > 0.0) {
                return Err(Error::InvalidParameter {
                    name: "metres_per_unit",
                    value: metres_per_unit.to_string(),
                    reason: "must be positive and finite".into(),
                });
            }
            let area = tf.pixel_area() * metres_per_unit * metres_per_unit / M2_PER_KM2;
            vec![area; rows * cols]
        }
        CellAreaMode::Ellipsoidal => {
            if tf.row_rotation.abs() > 1e-10 || tf.col_rotation.abs() > 1e-10 {
                return Err(Error::Algorithm(
                    "ellipsoidal cell area requires a grid without rotation".into(),
                ));
            }
            let (_, min_y, _, max_y) = grid.bounds();
            if min_y < -90.0 - 1e-9 || max_y > 90.0 + 1e-9 {
                return Err(Error::Algorithm(format!(
                    "grid latitudes [{}, {}] fall outside ±90°; is the CRS really geographic?",
                    min_y, max_y
                )));
            }

            let d_lon = tf.pixel_width.abs();
            (0..rows)
                .into_par_iter()
                .flat_map(|row| {
                    // Every cell in a row shares its latitude band
                    let lat_top = tf.origin_y + row as f64 * tf.pixel_height;
                    let lat_bottom = lat_top + tf.pixel_height;
                    vec![geographic_cell_area_km2(lat_top, lat_bottom, d_lon); cols]
                })
                .collect()
        }
        CellAreaMode::Auto => unreachable!("resolve() never returns Auto"),
    };

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    grid.with_data(array)
}
