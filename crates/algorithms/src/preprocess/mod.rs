//! Field preparation ahead of evaluation
//!
//! - **units**: temperature units and depth sign convention
//! - **stack**: per-cell mean of a time series
//! - **resample**: nearest-neighbour resampling onto a reference grid

mod resample;
mod stack;
mod units;

pub use resample::resample_nearest;
pub use stack::stack_mean;
pub use units::{normalize_depth, normalize_temperature, DepthConvention, TemperatureUnit};
