//! Error types for AquaSuit

use thiserror::Error;

/// Main error type for AquaSuit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Two grids that must be co-registered have different shapes.
    #[error("Raster shape mismatch for '{variable}': expected ({er}, {ec}), got ({ar}, {ac})")]
    ShapeMismatch {
        variable: String,
        er: usize,
        ec: usize,
        ar: usize,
        ac: usize,
    },

    /// Same shape, but origin or resolution differ.
    #[error("Geotransform mismatch for '{variable}': {expected:?} vs {actual:?}")]
    TransformMismatch {
        variable: String,
        expected: [f64; 6],
        actual: [f64; 6],
    },

    #[error("CRS mismatch for '{variable}': {expected} vs {actual}")]
    CrsMismatch {
        variable: String,
        expected: String,
        actual: String,
    },

    /// A field was supplied without a tolerance range.
    #[error("No tolerance range supplied for field '{variable}'")]
    MissingRange { variable: String },

    /// A tolerance range was supplied for a field that does not exist.
    #[error("Tolerance range '{variable}' has no matching field")]
    MissingField { variable: String },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Vector data error: {0}")]
    Vector(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for AquaSuit operations
pub type Result<T> = std::result::Result<T, Error>;
