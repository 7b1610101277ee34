//! # AquaSuit Algorithms
//!
//! Species suitability analysis for AquaSuit.
//!
//! ## Modules
//!
//! - **suitability**: tolerance ranges, reclassification, mask conjunction,
//!   the evaluator
//! - **area**: ellipsoidal and planar cell areas, zone polygon areas
//! - **statistics**: zone rasterization and suitable area per zone
//! - **preprocess**: unit normalisation, time-series mean, resampling

pub mod area;
pub mod preprocess;
pub mod statistics;
pub mod suitability;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::area::{cell_area_km2, zone_area_km2, zones_from_records, CellAreaMode};
    pub use crate::preprocess::{
        normalize_depth, normalize_temperature, resample_nearest, stack_mean,
        DepthConvention, TemperatureUnit,
    };
    pub use crate::statistics::{rasterize_zones, zonal_suitable_area, ZoneSummary};
    pub use crate::suitability::{
        combine_masks, evaluate, evaluate_species, evaluate_with, reclassify_range,
        Evaluation, EvaluationParams, SpeciesEvaluation, SpeciesProfile,
        SuitabilityEvaluator, SuitabilityInput, ToleranceRange, SUITABLE, UNSUITABLE,
    };
    pub use aquasuit_core::prelude::*;
}
