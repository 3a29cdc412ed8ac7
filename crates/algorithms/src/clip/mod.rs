//! Clipping classified rasters to a boundary polygon
//!
//! The pipeline is three steps, each usable on its own:
//!
//! 1. [`reconcile_crs`]: bring the boundary into the raster's CRS
//! 2. [`crop_to_boundary`]: crop to the polygon's pixel window and flag the
//!    pixels whose centers fall inside it
//! 3. [`class_presence_mask`]: turn the cropped classes into a 0/1 mask
//!
//! [`clip`] runs all three.

mod mask;
mod rasterize;

pub use mask::{ClassMask, NodataPolicy, MASK_ABSENT, MASK_NODATA, MASK_PRESENT};

use landshift_core::{
    Algorithm, Boundary, CoordTransform, Error, GeoTransform, Raster, RasterElement, Result, CRS,
};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Urban class code of the reclassified land-cover product
pub const DEFAULT_TARGET_CLASS: i64 = 2;

/// Parameters for [`clip`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipParams {
    /// Class code marked as present in the mask
    pub target_class: i64,
    /// Representation of pixels outside the boundary or no-data
    pub nodata_policy: NodataPolicy,
    /// Take boundary coordinates as raster coordinates when the raster has
    /// no CRS. Without it such a raster is rejected.
    #[serde(default)]
    pub assume_boundary_crs: bool,
}

impl Default for ClipParams {
    fn default() -> Self {
        Self {
            target_class: DEFAULT_TARGET_CLASS,
            nodata_policy: NodataPolicy::AsAbsent,
            assume_boundary_crs: false,
        }
    }
}

/// A raster cropped to a boundary's bounding window
#[derive(Debug, Clone)]
pub struct ClippedRaster<T: RasterElement> {
    raster: Raster<T>,
    inside: Array2<bool>,
}

impl<T: RasterElement> ClippedRaster<T> {
    /// Cropped values; the transform's origin is the window corner
    pub fn raster(&self) -> &Raster<T> {
        &self.raster
    }

    pub fn transform(&self) -> &GeoTransform {
        self.raster.transform()
    }

    /// Per-pixel flag: center inside the polygon and value not no-data
    pub fn inside(&self) -> &Array2<bool> {
        &self.inside
    }

    pub fn shape(&self) -> (usize, usize) {
        self.raster.shape()
    }

    pub fn inside_count(&self) -> usize {
        self.inside.iter().filter(|&&b| b).count()
    }
}

/// Clip algorithm
#[derive(Debug, Clone, Default)]
pub struct Clip;

impl Algorithm for Clip {
    type Input = (Raster<f64>, Boundary);
    type Output = ClassMask;
    type Params = ClipParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Clip"
    }

    fn description(&self) -> &'static str {
        "Clip a classified raster to a boundary polygon and mask one class"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (raster, boundary) = input;
        clip(&raster, &boundary, &params)
    }
}

/// Clip `raster` to `boundary` and derive the presence mask of
/// `params.target_class`.
///
/// # Errors
/// - [`Error::UnsupportedCrs`] if the boundary cannot be reprojected, or
///   the raster has no CRS and `params.assume_boundary_crs` is unset
/// - [`Error::EmptyClipResult`] if the boundary misses the raster entirely
pub fn clip<T: RasterElement>(
    raster: &Raster<T>,
    boundary: &Boundary,
    params: &ClipParams,
) -> Result<ClassMask> {
    let boundary = match raster.crs() {
        None if params.assume_boundary_crs => {
            warn!(
                "Raster has no CRS, using boundary coordinates ({}) as-is",
                boundary.crs()
            );
            boundary.clone()
        }
        raster_crs => reconcile_crs(boundary, raster_crs)?,
    };
    let clipped = crop_to_boundary(raster, &boundary)?;
    let mask = class_presence_mask(&clipped, params);

    debug!(
        "Clipped to {}x{} window: {} pixels inside, {} of class {}",
        mask.rows(),
        mask.cols(),
        clipped.inside_count(),
        mask.present_count(),
        params.target_class
    );

    Ok(mask)
}

/// Express `boundary` in `raster_crs`.
///
/// Returns the boundary unchanged when the CRSs are equivalent. A raster
/// without a CRS is an [`Error::UnsupportedCrs`].
pub fn reconcile_crs(boundary: &Boundary, raster_crs: Option<&CRS>) -> Result<Boundary> {
    let Some(target) = raster_crs else {
        return Err(Error::UnsupportedCrs {
            from: boundary.crs().identifier(),
            to: "none (raster has no CRS)".to_string(),
        });
    };

    if boundary.crs().is_equivalent(target) {
        return Ok(boundary.clone());
    }

    let transform = CoordTransform::new(boundary.crs(), target)?;
    debug!("Reprojecting boundary {} -> {}", boundary.crs(), target);
    boundary.map_coords(target.clone(), |x, y| Ok(transform.apply(x, y)))
}

/// Crop `raster` to the pixel window of `boundary`'s bounding box and flag
/// the pixels inside the polygon.
///
/// `boundary` must already be in the raster's CRS. The window is rounded
/// outward to whole pixels and intersected with the raster extent.
pub fn crop_to_boundary<T: RasterElement>(
    raster: &Raster<T>,
    boundary: &Boundary,
) -> Result<ClippedRaster<T>> {
    let bounds = boundary.bounds().ok_or(Error::EmptyClipResult)?;
    let window = raster
        .transform()
        .window_for_bounds(bounds, raster.rows(), raster.cols());
    if window.is_empty() {
        return Err(Error::EmptyClipResult);
    }
    debug!("Crop window {:?} of {}x{} raster", window, raster.rows(), raster.cols());

    let cropped = raster.crop(&window)?;
    let mut inside = rasterize::rasterize(
        boundary.geometry(),
        cropped.transform(),
        cropped.rows(),
        cropped.cols(),
    );

    let nodata = cropped.nodata();
    Zip::from(&mut inside)
        .and(cropped.data())
        .for_each(|flag, value| {
            if *flag && value.is_nodata(nodata) {
                *flag = false;
            }
        });

    Ok(ClippedRaster {
        raster: cropped,
        inside,
    })
}

/// Mask with 1 where an inside pixel equals `params.target_class`, 0 for
/// other inside pixels, and the policy's missing value elsewhere.
pub fn class_presence_mask<T: RasterElement>(
    clipped: &ClippedRaster<T>,
    params: &ClipParams,
) -> ClassMask {
    let missing = params.nodata_policy.missing_value();
    let data = Zip::from(clipped.raster.data())
        .and(&clipped.inside)
        .map_collect(|&value, &inside| {
            if !inside {
                missing
            } else if value.matches_class(params.target_class) {
                MASK_PRESENT
            } else {
                MASK_ABSENT
            }
        });

    ClassMask::new_unchecked(data, *clipped.transform())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use ndarray::array;

    /// 6x6 raster of 30 m cells in CONUS Albers, origin (0, 180)
    fn landcover() -> Raster<u8> {
        #[rustfmt::skip]
        let data = vec![
            1, 1, 1, 1, 1, 1,
            1, 2, 2, 1, 1, 1,
            1, 2, 2, 2, 1, 1,
            1, 1, 2, 255, 2, 1,
            1, 1, 1, 2, 2, 1,
            1, 1, 1, 1, 1, 1,
        ];
        Raster::from_vec(data, 6, 6)
            .unwrap()
            .with_transform(GeoTransform::new(0.0, 180.0, 30.0, -30.0))
            .with_crs(CRS::conus_albers())
            .with_nodata(255)
    }

    fn boundary(min_x: f64, min_y: f64, max_x: f64, max_y: f64, crs: CRS) -> Boundary {
        let poly = polygon![
            (x: min_x, y: min_y), (x: max_x, y: min_y), (x: max_x, y: max_y), (x: min_x, y: max_y), (x: min_x, y: min_y),
        ];
        Boundary::new(MultiPolygon::new(vec![poly]), crs)
    }

    #[test]
    fn clip_inner_square() {
        // Pixels rows 1..5, cols 1..5
        let b = boundary(30.0, 30.0, 150.0, 150.0, CRS::conus_albers());
        let mask = clip(&landcover(), &b, &ClipParams::default()).unwrap();
        assert_eq!(
            mask.data(),
            &array![
                [1, 1, 0, 0],
                [1, 1, 1, 0],
                [0, 1, 0, 1],
                [0, 0, 1, 1],
            ]
        );
        assert_eq!(mask.transform().origin_x, 30.0);
        assert_eq!(mask.transform().origin_y, 150.0);
    }

    #[test]
    fn nodata_pixel_is_preserved_on_request() {
        let b = boundary(30.0, 30.0, 150.0, 150.0, CRS::conus_albers());
        let params = ClipParams {
            nodata_policy: NodataPolicy::Preserve,
            ..ClipParams::default()
        };
        let mask = clip(&landcover(), &b, &params).unwrap();
        assert_eq!(mask.view()[(2, 2)], MASK_NODATA);
        assert_eq!(mask.nodata_count(), 1);
        assert_eq!(mask.present_count(), 9);
    }

    #[test]
    fn outside_pixels_are_missing_not_zero() {
        // Triangle over the window: corner pixels fall outside
        let poly = polygon![
            (x: 0.0, y: 0.0), (x: 180.0, y: 0.0), (x: 180.0, y: 180.0), (x: 0.0, y: 0.0),
        ];
        let b = Boundary::new(MultiPolygon::new(vec![poly]), CRS::conus_albers());
        let params = ClipParams {
            target_class: 1,
            nodata_policy: NodataPolicy::Preserve,
            ..ClipParams::default()
        };
        let mask = clip(&landcover(), &b, &params).unwrap();
        assert_eq!(mask.shape(), (6, 6));
        assert_eq!(mask.view()[(0, 0)], MASK_NODATA);
        assert_eq!(mask.view()[(5, 0)], MASK_PRESENT);
        assert_eq!(mask.view()[(0, 5)], MASK_PRESENT);
    }

    #[test]
    fn window_rounds_outward_and_clamps() {
        let b = boundary(-100.0, 100.0, 40.0, 500.0, CRS::conus_albers());
        let clipped = crop_to_boundary(&landcover(), &b).unwrap();
        // x -100..40 -> cols 0..2, y 100..500 -> rows 0..3
        assert_eq!(clipped.shape(), (3, 2));
        assert_eq!(clipped.transform().origin_y, 180.0);
    }

    #[test]
    fn disjoint_boundary_is_empty_clip() {
        let b = boundary(1000.0, 1000.0, 1100.0, 1100.0, CRS::conus_albers());
        assert!(matches!(
            clip(&landcover(), &b, &ClipParams::default()),
            Err(Error::EmptyClipResult)
        ));
    }

    #[test]
    fn equivalent_crs_is_not_reprojected() {
        let b = boundary(-80.0, 35.0, -79.0, 36.0, CRS::from_epsg(4326));
        let same = reconcile_crs(&b, Some(&CRS::from_epsg(4326))).unwrap();
        assert_eq!(same.bounds(), b.bounds());
    }

    #[test]
    fn equivalent_datum_gives_identical_mask() {
        // Same landcover on a lon/lat grid of 0.01 degree cells
        let raster = Raster::from_array(landcover().into_array())
            .with_transform(GeoTransform::new(-79.0, 36.0, 0.01, -0.01))
            .with_crs(CRS::from_epsg(4326))
            .with_nodata(255);

        // Inner 4x4 pixels, edges a quarter pixel inside the window
        let in_raster_crs = boundary(-78.9875, 35.9525, -78.9525, 35.9875, CRS::from_epsg(4326));
        let in_nad83 = boundary(-78.9875, 35.9525, -78.9525, 35.9875, CRS::from_epsg(4269));
        assert!(CoordTransform::new(&CRS::from_epsg(4269), &CRS::from_epsg(4326))
            .unwrap()
            .is_identity());

        let direct = clip(&raster, &in_raster_crs, &ClipParams::default()).unwrap();
        let reprojected = clip(&raster, &in_nad83, &ClipParams::default()).unwrap();
        assert_eq!(direct, reprojected);
        assert_eq!(direct.shape(), (4, 4));
        assert_eq!(direct.present_count(), 9);
    }

    #[test]
    fn raster_without_crs_is_rejected() {
        let raster = Raster::from_array(landcover().into_array())
            .with_transform(GeoTransform::new(0.0, 180.0, 30.0, -30.0));
        let b = boundary(30.0, 30.0, 150.0, 150.0, CRS::conus_albers());

        match clip(&raster, &b, &ClipParams::default()) {
            Err(Error::UnsupportedCrs { from, .. }) => assert_eq!(from, "EPSG:5070"),
            other => panic!("expected UnsupportedCrs, got {other:?}"),
        }
        assert!(reconcile_crs(&b, None).is_err());

        let params = ClipParams {
            assume_boundary_crs: true,
            ..ClipParams::default()
        };
        let mask = clip(&raster, &b, &params).unwrap();
        assert_eq!(mask.present_count(), 9);
    }

    #[test]
    fn reprojection_moves_vertices() {
        let b = boundary(-96.5, 23.0, -95.5, 24.0, CRS::from_epsg(4269));
        let projected = reconcile_crs(&b, Some(&CRS::conus_albers())).unwrap();
        let (min_x, min_y, max_x, max_y) = projected.bounds().unwrap();
        assert_eq!(projected.crs().epsg(), Some(5070));
        // Straddles the central meridian just north of the latitude of origin
        assert!(min_x < 0.0 && max_x > 0.0);
        assert!(min_y > -1000.0 && max_y < 120_000.0);
    }

    #[test]
    fn unsupported_crs_fails() {
        let b = boundary(0.0, 0.0, 1.0, 1.0, CRS::from_epsg(2154));
        assert!(matches!(
            clip(&landcover(), &b, &ClipParams::default()),
            Err(Error::UnsupportedCrs { .. })
        ));
    }

    #[test]
    fn algorithm_trait() {
        let raster = landcover().into_array().mapv(f64::from);
        let raster = Raster::from_array(raster)
            .with_transform(GeoTransform::new(0.0, 180.0, 30.0, -30.0))
            .with_crs(CRS::conus_albers())
            .with_nodata(255.0);
        let b = boundary(0.0, 0.0, 180.0, 180.0, CRS::conus_albers());
        let mask = Clip.execute_default((raster, b)).unwrap();
        assert_eq!(mask.present_count(), 9);
        assert_eq!(Clip.name(), "Clip");
    }
}
