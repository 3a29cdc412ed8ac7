//! Cell value trait for classified rasters

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Land-cover products store class codes as small unsigned integers, but
/// rasters resampled or exported by other tools often arrive as `i16`,
/// `i32` or floating point. All of them are accepted; class matching goes
/// through [`RasterElement::matches_class`].
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Default no-data value for this type
    fn default_nodata() -> Self;

    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Cell value as f64, `None` if it does not fit
    fn as_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// Whether this cell holds exactly the integer class `code`
    fn matches_class(self, code: i64) -> bool {
        match self.as_f64() {
            Some(v) => v == code as f64,
            None => false,
        }
    }

    /// Integer class code of this cell, if it is a whole number
    fn class_code(self) -> Option<i64> {
        let v = self.as_f64()?;
        if v.is_finite() && v.fract() == 0.0 {
            Some(v as i64)
        } else {
            None
        }
    }
}

macro_rules! impl_raster_element_int {
    ($t:ty) => {
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::MAX
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                match nodata {
                    Some(nd) => *self == nd,
                    None => false,
                }
            }
        }
    };
}

macro_rules! impl_raster_element_float {
    ($t:ty) => {
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::NAN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                    None => false,
                }
            }
        }
    };
}

impl_raster_element_int!(i8);
impl_raster_element_int!(i16);
impl_raster_element_int!(i32);
impl_raster_element_int!(i64);
impl_raster_element_int!(u8);
impl_raster_element_int!(u16);
impl_raster_element_int!(u32);
impl_raster_element_int!(u64);
impl_raster_element_float!(f32);
impl_raster_element_float!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_matching_across_types() {
        assert!(2u8.matches_class(2));
        assert!(!3u8.matches_class(2));
        assert!(2.0f32.matches_class(2));
        assert!(!2.5f32.matches_class(2));
        assert!((-1i16).matches_class(-1));
    }

    #[test]
    fn class_code_rejects_fractions() {
        assert_eq!(21u8.class_code(), Some(21));
        assert_eq!(21.0f64.class_code(), Some(21));
        assert_eq!(21.5f64.class_code(), None);
        assert_eq!(f32::NAN.class_code(), None);
    }

    #[test]
    fn nodata_detection() {
        assert!(255u8.is_nodata(Some(255)));
        assert!(!0u8.is_nodata(Some(255)));
        assert!(!0u8.is_nodata(None));
        assert!(f32::NAN.is_nodata(None));
        assert!((-9999.0f64).is_nodata(Some(-9999.0)));
    }
}
