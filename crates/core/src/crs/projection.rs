//! Pure-Rust map projections for boundary reprojection.
//!
//! Supports geographic lon/lat (EPSG 4326, 4269, 4258), Web Mercator (3857),
//! UTM North/South (326xx/327xx, 269xx) and the two CONUS Albers Equal Area
//! grids (EPSG 5070, origin 23N, and ESRI 102003, origin 37.5N). Datum shifts between WGS84, NAD83 and ETRS89 are
//! ignored; they stay below a metre, well under the land-cover grid spacing.
//!
//! Formulas follow Snyder (1987), USGS Professional Paper 1395.

use super::CRS;
use crate::error::{Error, Result};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

// ── Ellipsoid constants ──────────────────────────────────────────────────

const A: f64 = 6_378_137.0; // WGS84 / GRS80 semi-major axis (m)
const F_WGS84: f64 = 1.0 / 298.257_223_563;
const F_GRS80: f64 = 1.0 / 298.257_222_101;

const K0_UTM: f64 = 0.9996;
const FALSE_EASTING_UTM: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

// CONUS Albers: standard parallels 29.5 / 45.5, origin 23N 96W
const ALBERS_LAT1: f64 = 29.5;
const ALBERS_LAT2: f64 = 45.5;
const ALBERS_LAT0: f64 = 23.0;
const ALBERS_LON0: f64 = -96.0;
// ESRI USA_Contiguous_Albers_Equal_Area_Conic shares the cone, origin 37.5N
const ESRI_ALBERS_LAT0: f64 = 37.5;

/// A supported projection, resolved from a [`CRS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Longitude/latitude in degrees
    Geographic,
    /// Spherical Web Mercator in metres
    WebMercator,
    /// Universal Transverse Mercator
    Utm { zone: u32, north: bool },
    /// NAD83 / Conus Albers Equal Area (EPSG:5070)
    ConusAlbers,
    /// USA Contiguous Albers Equal Area Conic (ESRI:102003)
    UsaContiguousAlbers,
}

impl Projection {
    /// Resolve the projection of a CRS from its EPSG code.
    pub fn from_crs(crs: &CRS) -> Result<Self> {
        let unsupported = || Error::UnsupportedCrs {
            from: crs.identifier(),
            to: "a supported projection".to_string(),
        };
        let code = crs.epsg().ok_or_else(unsupported)?;

        match code {
            4326 | 4269 | 4258 | 4152 => Ok(Projection::Geographic),
            3857 | 900913 => Ok(Projection::WebMercator),
            5070 => Ok(Projection::ConusAlbers),
            102003 => Ok(Projection::UsaContiguousAlbers),
            32601..=32660 => Ok(Projection::Utm { zone: code - 32600, north: true }),
            32701..=32760 => Ok(Projection::Utm { zone: code - 32700, north: false }),
            26901..=26923 => Ok(Projection::Utm { zone: code - 26900, north: true }),
            _ => Err(unsupported()),
        }
    }

    /// Project (lon, lat) degrees into this projection's coordinates.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        match *self {
            Projection::Geographic => (lon, lat),
            Projection::WebMercator => lonlat_to_mercator(lon, lat),
            Projection::Utm { zone, north } => lonlat_to_utm(lon, lat, zone, north),
            Projection::ConusAlbers => Albers::conus().forward(lon, lat),
            Projection::UsaContiguousAlbers => Albers::usa_contiguous().forward(lon, lat),
        }
    }

    /// Unproject this projection's coordinates into (lon, lat) degrees.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        match *self {
            Projection::Geographic => (x, y),
            Projection::WebMercator => mercator_to_lonlat(x, y),
            Projection::Utm { zone, north } => utm_to_lonlat(x, y, zone, north),
            Projection::ConusAlbers => Albers::conus().inverse(x, y),
            Projection::UsaContiguousAlbers => Albers::usa_contiguous().inverse(x, y),
        }
    }
}

/// A coordinate transformation between two CRSs, routed through geographic
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordTransform {
    source: Projection,
    target: Projection,
}

impl CoordTransform {
    /// Build the transformation from `from` into `to`.
    pub fn new(from: &CRS, to: &CRS) -> Result<Self> {
        let source = Projection::from_crs(from).map_err(|_| Error::UnsupportedCrs {
            from: from.identifier(),
            to: to.identifier(),
        })?;
        let target = Projection::from_crs(to).map_err(|_| Error::UnsupportedCrs {
            from: from.identifier(),
            to: to.identifier(),
        })?;
        Ok(Self { source, target })
    }

    /// Whether both ends resolve to the same projection.
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }

    /// Transform a single coordinate.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        if self.is_identity() {
            return (x, y);
        }
        let (lon, lat) = self.source.unproject(x, y);
        self.target.project(lon, lat)
    }
}

// ── Web Mercator ─────────────────────────────────────────────────────────

fn lonlat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = A * lon.to_radians();
    let y = A * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

fn mercator_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / A).to_degrees();
    let lat = (2.0 * (y / A).exp().atan() - FRAC_PI_2).to_degrees();
    (lon, lat)
}

// ── UTM (Snyder pp. 61-64) ───────────────────────────────────────────────

fn utm_central_meridian(zone: u32) -> f64 {
    ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
}

fn lonlat_to_utm(lon_deg: f64, lat_deg: f64, zone: u32, north: bool) -> (f64, f64) {
    let e2 = 2.0 * F_WGS84 - F_WGS84 * F_WGS84;
    let ep2 = e2 / (1.0 - e2);

    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let lon0 = utm_central_meridian(zone);

    let (sin_lat, cos_lat, tan_lat) = (lat.sin(), lat.cos(), lat.tan());

    let n = A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ep2 * cos_lat * cos_lat;
    let a = cos_lat * (lon - lon0);
    let m = meridional_arc(lat, e2);

    let a2 = a * a;
    let a4 = a2 * a2;
    let a6 = a4 * a2;

    let easting = K0_UTM
        * n
        * (a + (1.0 - t + c) * a2 * a / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a4 * a / 120.0)
        + FALSE_EASTING_UTM;

    let northing = K0_UTM
        * (m + n
            * tan_lat
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));

    let northing = if north { northing } else { northing + FALSE_NORTHING_SOUTH };
    (easting, northing)
}

fn utm_to_lonlat(easting: f64, northing: f64, zone: u32, north: bool) -> (f64, f64) {
    let e2 = 2.0 * F_WGS84 - F_WGS84 * F_WGS84;
    let ep2 = e2 / (1.0 - e2);
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    let y = if north { northing } else { northing - FALSE_NORTHING_SOUTH };
    let x = easting - FALSE_EASTING_UTM;

    let m = y / K0_UTM;
    let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let sq = (1.0 - e2).sqrt();
    let e1 = (1.0 - sq) / (1.0 + sq);
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin1, cos1, tan1) = (phi1.sin(), phi1.cos(), phi1.tan());
    let c1 = ep2 * cos1 * cos1;
    let t1 = tan1 * tan1;
    let w = 1.0 - e2 * sin1 * sin1;
    let n1 = A / w.sqrt();
    let r1 = A * (1.0 - e2) / w.powf(1.5);
    let d = x / (n1 * K0_UTM);

    let d2 = d * d;
    let d4 = d2 * d2;
    let d6 = d4 * d2;

    let lat = phi1
        - (n1 * tan1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d6
                    / 720.0);

    let lon = utm_central_meridian(zone)
        + (d - (1.0 + 2.0 * t1 + c1) * d2 * d / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d4 * d
                / 120.0)
            / cos1;

    (lon.to_degrees(), lat.to_degrees())
}

/// Meridional arc from equator to latitude `lat` (radians), Snyder eq. 3-21.
fn meridional_arc(lat: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    A * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

// ── Albers Equal Area Conic (Snyder pp. 98-103) ──────────────────────────

struct Albers {
    e: f64,
    e2: f64,
    n: f64,
    c: f64,
    rho0: f64,
    lon0: f64,
}

impl Albers {
    fn conus() -> Self {
        Self::new(ALBERS_LAT1, ALBERS_LAT2, ALBERS_LAT0, ALBERS_LON0)
    }

    fn usa_contiguous() -> Self {
        Self::new(ALBERS_LAT1, ALBERS_LAT2, ESRI_ALBERS_LAT0, ALBERS_LON0)
    }

    fn new(lat1: f64, lat2: f64, lat0: f64, lon0: f64) -> Self {
        let e2 = 2.0 * F_GRS80 - F_GRS80 * F_GRS80;
        let e = e2.sqrt();

        let m = |phi: f64| phi.cos() / (1.0 - e2 * phi.sin().powi(2)).sqrt();
        let (phi1, phi2, phi0) = (lat1.to_radians(), lat2.to_radians(), lat0.to_radians());
        let (m1, m2) = (m(phi1), m(phi2));
        let (q1, q2, q0) = (albers_q(phi1, e), albers_q(phi2, e), albers_q(phi0, e));

        let n = (m1 * m1 - m2 * m2) / (q2 - q1);
        let c = m1 * m1 + n * q1;
        let rho0 = A * (c - n * q0).sqrt() / n;

        Self { e, e2, n, c, rho0, lon0: lon0.to_radians() }
    }

    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let q = albers_q(lat.to_radians(), self.e);
        let rho = A * (self.c - self.n * q).sqrt() / self.n;
        let theta = self.n * (lon.to_radians() - self.lon0);
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let dy = self.rho0 - y;
        let rho = (x * x + dy * dy).sqrt();
        let theta = x.atan2(dy);
        let q = (self.c - rho * rho * self.n * self.n / (A * A)) / self.n;

        let mut phi = (q / 2.0).clamp(-1.0, 1.0).asin();
        for _ in 0..15 {
            let sin_phi = phi.sin();
            let w = 1.0 - self.e2 * sin_phi * sin_phi;
            let delta = w * w / (2.0 * phi.cos())
                * (q / (1.0 - self.e2) - sin_phi / w
                    + (1.0 / (2.0 * self.e))
                        * ((1.0 - self.e * sin_phi) / (1.0 + self.e * sin_phi)).ln());
            phi += delta;
            if delta.abs() < 1e-12 {
                break;
            }
        }

        let lon = self.lon0 + theta / self.n;
        (lon.to_degrees(), phi.to_degrees())
    }
}

fn albers_q(phi: f64, e: f64) -> f64 {
    let e2 = e * e;
    let s = phi.sin();
    (1.0 - e2) * (s / (1.0 - e2 * s * s) - (1.0 / (2.0 * e)) * ((1.0 - e * s) / (1.0 + e * s)).ln())
}
