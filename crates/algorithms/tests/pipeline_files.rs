//! End-to-end analysis through files: GeoTIFF rasters in CONUS Albers and a
//! GeoJSON county layer in NAD83 geographic coordinates.
//!
//! The county polygon is built by unprojecting a rectangle of the raster
//! grid inset by a quarter pixel, so after reprojection its pixel window and
//! inside pixels are unambiguous.

use approx::assert_relative_eq;
use landshift_algorithms::analysis::{analyze_files, AnalysisParams};
use landshift_algorithms::clip::{clip, ClipParams, NodataPolicy, MASK_NODATA};
use landshift_algorithms::direction::SectorWindow;
use landshift_core::crs::Projection;
use landshift_core::io::{read_boundary_layer, read_geotiff, write_geotiff};
use landshift_core::{Error, GeoTransform, Raster, Selection, CRS};
use std::path::Path;
use tempfile::TempDir;

// ── Fixtures ──────────────────────────────────────────────────────────

/// Upper-left corner of the grid, near Raleigh NC in EPSG:5070
const ORIGIN_X: f64 = 1_520_000.0;
const ORIGIN_Y: f64 = 1_560_000.0;
const CELL: f64 = 30.0;
const SIZE: usize = 12;

fn grid_transform() -> GeoTransform {
    GeoTransform::new(ORIGIN_X, ORIGIN_Y, CELL, -CELL)
}

/// Class 2 on every pixel whose row and col are both >= `from`, else 1
fn landcover(from: usize) -> Raster<u8> {
    let data = (0..SIZE * SIZE)
        .map(|i| if i / SIZE >= from && i % SIZE >= from { 2 } else { 1 })
        .collect();
    Raster::from_vec(data, SIZE, SIZE)
        .unwrap()
        .with_transform(grid_transform())
        .with_crs(CRS::conus_albers())
        .with_nodata(255)
}

/// GeoJSON ring (lon/lat) covering the pixel centers of rows `r0..r1`,
/// cols `c0..c1`
fn ring_lonlat(r0: usize, r1: usize, c0: usize, c1: usize) -> String {
    let albers = Projection::from_crs(&CRS::conus_albers()).unwrap();
    let gt = grid_transform();
    let (top, bottom) = (r0 as f64 + 0.25, r1 as f64 - 0.25);
    let (left, right) = (c0 as f64 + 0.25, c1 as f64 - 0.25);
    let corners = [(left, bottom), (right, bottom), (right, top), (left, top), (left, bottom)];
    let coords: Vec<String> = corners
        .iter()
        .map(|&(c, r)| {
            let (x, y) = gt.apply(c, r);
            let (lon, lat) = albers.unproject(x, y);
            format!("[{lon:.10}, {lat:.10}]")
        })
        .collect();
    format!("[[{}]]", coords.join(", "))
}

fn counties_geojson() -> String {
    format!(
        r#"{{
  "type": "FeatureCollection",
  "crs": {{"type": "name", "properties": {{"name": "EPSG:4269"}}}},
  "features": [
    {{"type": "Feature", "properties": {{"NAME": "Wake", "STATE_NAME": "North Carolina"}},
      "geometry": {{"type": "Polygon", "coordinates": {wake}}}}},
    {{"type": "Feature", "properties": {{"NAME": "Wake", "STATE_NAME": "Virginia"}},
      "geometry": {{"type": "Polygon", "coordinates": {other}}}}},
    {{"type": "Feature", "properties": {{"NAME": "Far", "STATE_NAME": "North Carolina"}},
      "geometry": {{"type": "Polygon", "coordinates": [[[-70.0, 40.0], [-69.9, 40.0], [-69.9, 40.1], [-70.0, 40.0]]]}}}}
  ]
}}"#,
        wake = ring_lonlat(2, 10, 2, 10),
        other = ring_lonlat(0, 4, 0, 4),
    )
}

struct Workspace {
    _dir: TempDir,
    start: std::path::PathBuf,
    end: std::path::PathBuf,
    counties: std::path::PathBuf,
}

fn workspace() -> Workspace {
    let dir = TempDir::new().unwrap();
    let start = dir.path().join("landcover_2001.tif");
    let end = dir.path().join("landcover_2019.tif");
    let counties = dir.path().join("counties.geojson");

    write_geotiff(&landcover(8), &start, None).unwrap();
    write_geotiff(&landcover(4), &end, None).unwrap();
    std::fs::write(&counties, counties_geojson()).unwrap();

    Workspace {
        _dir: dir,
        start,
        end,
        counties,
    }
}

fn wake_nc() -> Selection {
    Selection::new()
        .field("NAME", "Wake")
        .field("STATE_NAME", "North Carolina")
}

// ── Tests ─────────────────────────────────────────────────────────────

#[test]
fn geotiff_fixture_keeps_georeferencing() {
    let ws = workspace();
    let raster: Raster<u8> = read_geotiff(&ws.start, None).unwrap();
    assert_eq!(raster.shape(), (SIZE, SIZE));
    assert_eq!(raster.crs().and_then(|c| c.epsg()), Some(5070));
    assert_eq!(raster.transform(), &grid_transform());
    assert_eq!(raster.class_histogram().count(2), 16);
}

#[test]
fn county_is_clipped_to_its_window() {
    let ws = workspace();
    let layer = read_boundary_layer(&ws.counties).unwrap();
    let boundary = layer.select(&wake_nc()).unwrap();

    let raster: Raster<u8> = read_geotiff(&ws.end, None).unwrap();
    let mask = clip(&raster, &boundary, &ClipParams::default()).unwrap();

    assert_eq!(mask.shape(), (8, 8));
    assert_relative_eq!(mask.transform().origin_x, ORIGIN_X + 2.0 * CELL);
    assert_relative_eq!(mask.transform().origin_y, ORIGIN_Y - 2.0 * CELL);
    // Class 2 from row/col 4 on, i.e. 6x6 of the 8x8 window
    assert_eq!(mask.present_count(), 36);
}

#[test]
fn analyze_files_counts_growth() {
    let ws = workspace();
    let layer = read_boundary_layer(&ws.counties).unwrap();

    let (start, end) =
        analyze_files(&ws.start, &ws.end, &layer, &wake_nc(), &AnalysisParams::default()).unwrap();

    // Window rows/cols 2..10, center (4, 4). Start class 2 covers window
    // rows/cols 6..8, end covers 2..8.
    assert_eq!(start.as_array(), &[0, 0, 0, 1, 0, 0, 0, 0]);
    assert_eq!(end.as_array(), &[3, 9, 3, 9, 3, 9, 3, 9]);
    assert!(end.total() > start.total());
}

#[test]
fn analyze_files_with_full_window() {
    let ws = workspace();
    let layer = read_boundary_layer(&ws.counties).unwrap();
    let params = AnalysisParams {
        window: SectorWindow::Full,
        ..AnalysisParams::default()
    };

    let (start, end) = analyze_files(&ws.start, &ws.end, &layer, &wake_nc(), &params).unwrap();
    assert_eq!(start.as_array(), &[4; 8]);
    assert_eq!(end.as_array(), &[36; 8]);
}

#[test]
fn unmatched_selection_fails_before_reading_rasters() {
    let ws = workspace();
    let layer = read_boundary_layer(&ws.counties).unwrap();
    let selection = Selection::new()
        .field("NAME", "Wake")
        .field("STATE_NAME", "South Carolina");

    let missing = Path::new("/nonexistent/landcover.tif");
    let result = analyze_files(missing, missing, &layer, &selection, &AnalysisParams::default());
    assert!(matches!(result, Err(Error::NoMatchingGeometry { .. })));
}

#[test]
fn ambiguous_selection_fails() {
    let ws = workspace();
    let layer = read_boundary_layer(&ws.counties).unwrap();
    let selection = Selection::new().field("NAME", "Wake");
    let result = analyze_files(&ws.start, &ws.end, &layer, &selection, &AnalysisParams::default());
    assert!(matches!(result, Err(Error::AmbiguousGeometry { count: 2, .. })));
}

#[test]
fn missing_raster_is_open_error() {
    let ws = workspace();
    let layer = read_boundary_layer(&ws.counties).unwrap();
    let missing = ws.start.with_file_name("absent.tif");
    let result = analyze_files(&missing, &ws.end, &layer, &wake_nc(), &AnalysisParams::default());
    assert!(matches!(result, Err(Error::RasterOpen { .. })));
}

#[test]
fn county_outside_raster_is_empty_clip() {
    let ws = workspace();
    let layer = read_boundary_layer(&ws.counties).unwrap();
    let selection = Selection::new().field("NAME", "Far");
    let result = analyze_files(&ws.start, &ws.end, &layer, &selection, &AnalysisParams::default());
    assert!(matches!(result, Err(Error::EmptyClipResult)));
}

#[test]
fn preserve_policy_leaves_covered_window_intact() {
    let ws = workspace();
    let layer = read_boundary_layer(&ws.counties).unwrap();
    let boundary = layer.select(&wake_nc()).unwrap();
    let raster: Raster<u8> = read_geotiff(&ws.end, None).unwrap();
    let params = ClipParams {
        nodata_policy: NodataPolicy::Preserve,
        ..ClipParams::default()
    };
    let mask = clip(&raster, &boundary, &params).unwrap();
    assert!(mask.view().iter().all(|&v| v != MASK_NODATA));
}
