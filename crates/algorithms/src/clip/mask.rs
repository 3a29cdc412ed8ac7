//! Binary class-presence masks

use landshift_core::{Error, GeoTransform, Result};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mask value for a pixel holding the target class
pub const MASK_PRESENT: u8 = 1;
/// Mask value for a valid pixel of any other class
pub const MASK_ABSENT: u8 = 0;
/// Mask value for a pixel outside the boundary or flagged no-data
pub const MASK_NODATA: u8 = 255;

/// How pixels outside the boundary (or no-data) appear in the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodataPolicy {
    /// Missing pixels become [`MASK_ABSENT`]
    #[default]
    AsAbsent,
    /// Missing pixels keep [`MASK_NODATA`]
    Preserve,
}

impl NodataPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            NodataPolicy::AsAbsent => "as-absent",
            NodataPolicy::Preserve => "preserve",
        }
    }

    /// Mask value written for missing pixels
    pub fn missing_value(&self) -> u8 {
        match self {
            NodataPolicy::AsAbsent => MASK_ABSENT,
            NodataPolicy::Preserve => MASK_NODATA,
        }
    }
}

impl fmt::Display for NodataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodataPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "as-absent" | "absent" | "zero" => Ok(NodataPolicy::AsAbsent),
            "preserve" | "nodata" => Ok(NodataPolicy::Preserve),
            other => Err(Error::InvalidParameter {
                name: "nodata_policy",
                value: other.to_string(),
                reason: "expected 'as-absent' or 'preserve'".to_string(),
            }),
        }
    }
}

/// Class-presence mask of a clipped raster.
///
/// Values are restricted to [`MASK_PRESENT`], [`MASK_ABSENT`] and
/// [`MASK_NODATA`]; the shape is that of the clip window.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMask {
    data: Array2<u8>,
    transform: GeoTransform,
}

impl ClassMask {
    /// Wrap an existing array, rejecting values outside {0, 1, 255}
    pub fn from_array(data: Array2<u8>, transform: GeoTransform) -> Result<Self> {
        if let Some(&bad) = data
            .iter()
            .find(|&&v| v != MASK_PRESENT && v != MASK_ABSENT && v != MASK_NODATA)
        {
            return Err(Error::InvalidParameter {
                name: "mask",
                value: bad.to_string(),
                reason: "mask values must be 0, 1 or 255".to_string(),
            });
        }
        Ok(Self { data, transform })
    }

    pub(crate) fn new_unchecked(data: Array2<u8>, transform: GeoTransform) -> Self {
        Self { data, transform }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }

    pub fn data(&self) -> &Array2<u8> {
        &self.data
    }

    /// Transform of the clip window
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Number of pixels holding the target class
    pub fn present_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == MASK_PRESENT).count()
    }

    /// Number of pixels flagged [`MASK_NODATA`]
    pub fn nodata_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == MASK_NODATA).count()
    }
}
