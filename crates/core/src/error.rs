//! Error types for landshift

use thiserror::Error;

/// Main error type for landshift operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open raster {path}: {reason}")]
    RasterOpen { path: String, reason: String },

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Shape mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    ShapeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("No boundary feature matches {criteria}")]
    NoMatchingGeometry { criteria: String },

    #[error("{count} boundary features match {criteria}, expected exactly one")]
    AmbiguousGeometry { criteria: String, count: usize },

    #[error("Boundary does not intersect the raster extent")]
    EmptyClipResult,

    #[error("Cannot normalize {series} series: directional counts sum to zero")]
    EmptyDistribution { series: String },

    #[error("Unsupported CRS transformation: {from} -> {to}")]
    UnsupportedCrs { from: String, to: String },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GDAL error: {0}")]
    #[cfg(feature = "gdal")]
    Gdal(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Gdal(e.to_string())
    }
}

/// Result type alias for landshift operations
pub type Result<T> = std::result::Result<T, Error>;
