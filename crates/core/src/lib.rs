//! # landshift core
//!
//! Core types, traits and I/O shared by the landshift crates.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced grid of class codes
//! - `GeoTransform` and `PixelWindow`: pixel/world mapping and sub-windows
//! - `CRS` and `CoordTransform`: reference systems and reprojection
//! - `BoundaryLayer` / `Boundary`: administrative polygons and selection
//! - `DIRECTIONS` / `DirectionCounts`: the ordered eight-sector table
//! - GeoTIFF and GeoJSON readers

pub mod crs;
pub mod direction;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::{CoordTransform, CRS};
pub use direction::{Direction, DirectionCounts, DirectionStep, DIRECTIONS};
pub use error::{Error, Result};
pub use raster::{GeoTransform, PixelWindow, Raster, RasterElement};
pub use vector::{Boundary, BoundaryLayer, Selection};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::direction::{Direction, DirectionCounts, DIRECTIONS};
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, PixelWindow, Raster, RasterElement};
    pub use crate::vector::{Boundary, BoundaryLayer, Selection};
    pub use crate::Algorithm;
}

/// Core trait for the analysis stages.
///
/// Each stage is a pure function from input to output, steered by a
/// parameter struct with sensible defaults.
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
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
