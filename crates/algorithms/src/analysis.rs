//! End-to-end directional change analysis for a start/end raster pair

use crate::clip::{clip, ClipParams};
use crate::direction::{aggregate_pair, SectorWindow};
use landshift_core::io::read_geotiff;
use landshift_core::{
    Boundary, BoundaryLayer, DirectionCounts, Raster, RasterElement, Result, Selection,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Parameters for [`analyze`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub clip: ClipParams,
    pub window: SectorWindow,
}

/// Clip both rasters to `boundary` and count the target class per
/// direction around the shared window center.
pub fn analyze<T: RasterElement>(
    raster_start: &Raster<T>,
    raster_end: &Raster<T>,
    boundary: &Boundary,
    params: &AnalysisParams,
) -> Result<(DirectionCounts, DirectionCounts)> {
    let mask_start = clip(raster_start, boundary, &params.clip)?;
    let mask_end = clip(raster_end, boundary, &params.clip)?;

    let (start, end) = aggregate_pair(&mask_start, &mask_end, params.window)?;
    info!(
        "Class {} pixels: {} at start, {} at end",
        params.clip.target_class,
        mask_start.present_count(),
        mask_end.present_count()
    );
    Ok((start, end))
}

/// [`analyze`] on files.
///
/// The boundary is selected before either raster is opened, so a selection
/// that matches nothing fails without touching the rasters.
pub fn analyze_files(
    start_path: impl AsRef<Path>,
    end_path: impl AsRef<Path>,
    layer: &BoundaryLayer,
    selection: &Selection,
    params: &AnalysisParams,
) -> Result<(DirectionCounts, DirectionCounts)> {
    let boundary = layer.select(selection)?;
    info!("Selected boundary {}", selection);

    let raster_start: Raster<f64> = read_geotiff(start_path.as_ref(), None)?;
    let raster_end: Raster<f64> = read_geotiff(end_path.as_ref(), None)?;

    analyze(&raster_start, &raster_end, &boundary, params)
}
