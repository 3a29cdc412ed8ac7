//! # landshift algorithms
//!
//! The analysis stages of a directional land-cover change study.
//!
//! ## Modules
//!
//! - **clip**: CRS reconciliation, boundary crop, class-presence mask
//! - **direction**: eight-sector counts around the mask center
//! - **analysis**: both stages over a start/end raster pair

pub mod analysis;
pub mod clip;
pub mod direction;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analysis::{analyze, analyze_files, AnalysisParams};
    pub use crate::clip::{
        class_presence_mask, clip, crop_to_boundary, reconcile_crs, ClassMask, Clip, ClipParams,
        ClippedRaster, NodataPolicy, MASK_NODATA,
    };
    pub use crate::direction::{aggregate, aggregate_pair, roll, DirectionalCount, SectorWindow};
    pub use landshift_core::prelude::*;
}
