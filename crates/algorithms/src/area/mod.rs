//! Area measurement
//!
//! - **cell_area**: ground area of every raster cell (ellipsoidal or planar)
//! - **zone_area**: total area of zone polygons

pub mod cell_area;
pub mod zone_area;

pub use cell_area::{cell_area_km2, geographic_cell_area_km2, CellAreaMode};
pub use zone_area::{zone_area_km2, zones_from_records};
