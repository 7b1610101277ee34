//! Statistical aggregation of raster data
//!
//! - **zonal**: zone rasterization and suitable area per zone

pub mod zonal;

pub use zonal::{rasterize_zones, zonal_suitable_area, ZoneSummary, NO_ZONE};
