//! Species suitability
//!
//! - Reclassify: one environmental field → binary mask via a tolerance range
//! - Combine: conjunction of masks (elementwise product)
//! - Evaluate: fields + ranges + zones → composite grid and zone summaries

mod combine;
mod evaluate;
mod range;
mod reclassify;

pub use combine::combine_masks;
pub use evaluate::{
    evaluate, evaluate_species, evaluate_with, Evaluation, EvaluationParams, SpeciesEvaluation,
    SuitabilityEvaluator, SuitabilityInput,
};
pub use range::{SpeciesProfile, ToleranceRange};
pub use reclassify::reclassify_range;

/// Cell value of a suitable location
pub const SUITABLE: u8 = 1;
/// Cell value of an unsuitable location; also the grid's no-data value
pub const UNSUITABLE: u8 = 0;
