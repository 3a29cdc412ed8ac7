//! Coordinate Reference System handling

mod projection;

pub use projection::{CoordTransform, Projection};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation (primary)
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
    /// PROJ string if available
    proj: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
            proj: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            wkt: Some(wkt.into()),
            epsg: None,
            proj: None,
        }
    }

    /// Create a CRS from a PROJ string
    pub fn from_proj(proj: impl Into<String>) -> Self {
        Self {
            wkt: None,
            epsg: None,
            proj: Some(proj.into()),
        }
    }

    /// Parse a CRS name as found in GeoJSON `crs` members and CLI arguments.
    ///
    /// Accepts `EPSG:4326`, `urn:ogc:def:crs:EPSG::4269`,
    /// `urn:ogc:def:crs:OGC:1.3:CRS84` and bare EPSG numbers. Anything else is
    /// kept as an opaque PROJ string.
    pub fn from_name(name: &str) -> Self {
        let trimmed = name.trim();
        let upper = trimmed.to_ascii_uppercase();

        if upper.ends_with("CRS84") {
            return Self::wgs84();
        }
        if let Ok(code) = trimmed.parse::<u32>() {
            return Self::from_epsg(code);
        }
        if upper.starts_with("EPSG:") || upper.starts_with("URN:OGC:DEF:CRS:EPSG:") {
            if let Some(code) = upper.rsplit(':').next().and_then(|s| s.parse::<u32>().ok()) {
                return Self::from_epsg(code);
            }
        }
        Self::from_proj(trimmed)
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Self::from_epsg(3857)
    }

    /// NAD83 / Conus Albers (EPSG:5070), the grid of the US land-cover products
    pub fn conus_albers() -> Self {
        Self::from_epsg(5070)
    }

    /// EPSG code, either given directly or read from the root
    /// `AUTHORITY["EPSG", ...]` of the WKT
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
            .or_else(|| self.wkt.as_deref().and_then(wkt_authority_code))
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Get PROJ string
    pub fn proj(&self) -> Option<&str> {
        self.proj.as_deref()
    }

    /// Same EPSG code, or else identical WKT or PROJ text.
    ///
    /// Different datums are never equivalent here; datum-only differences
    /// are absorbed by [`CoordTransform::is_identity`].
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg(), other.epsg()) {
            return a == b;
        }

        // Textual comparison, imperfect for WKT with different formatting
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }

        if let (Some(a), Some(b)) = (&self.proj, &other.proj) {
            return a == b;
        }

        false
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg() {
            return format!("EPSG:{}", code);
        }
        if let Some(proj) = &self.proj {
            return proj.clone();
        }
        if let Some(wkt) = &self.wkt {
            let head: String = wkt.chars().take(50).collect();
            return format!("WKT:{}", head);
        }
        "Unknown".to_string()
    }
}

/// Code of the last `AUTHORITY["EPSG","<code>"]` in a WKT1 string, which
/// belongs to the root element
fn wkt_authority_code(wkt: &str) -> Option<u32> {
    let start = wkt.rfind("AUTHORITY[")? + "AUTHORITY[".len();
    let body = &wkt[start..];
    let body = &body[..body.find(']')?];
    let mut parts = body.split(',').map(|p| p.trim().trim_matches('"'));
    match (parts.next(), parts.next()) {
        (Some(auth), Some(code)) if auth.eq_ignore_ascii_case("EPSG") => code.parse().ok(),
        _ => None,
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wgs84()
    }
}
