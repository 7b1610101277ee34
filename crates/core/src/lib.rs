//! # AquaSuit Core
//!
//! Core types, traits and I/O for AquaSuit species suitability analysis.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced grid used for environmental fields and
//!   suitability masks
//! - `GeoTransform`: affine transformation for georeferencing
//! - `CRS`: coordinate reference system identity
//! - `Zone`: named polygon with a total area, used for aggregation
//! - GeoTIFF and GeoJSON readers/writers

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::Zone;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::vector::Zone;
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in AquaSuit.
///
/// Algorithms are pure functions that transform input data according to parameters.
/// Implementations hold no state between calls, so one instance may be shared
/// across threads.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
