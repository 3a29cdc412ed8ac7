//! GeoJSON boundary layer reader
//!
//! Accepts a FeatureCollection, a single Feature, or a bare Polygon /
//! MultiPolygon geometry. The CRS comes from the legacy `crs` member
//! (`{"type": "name", "properties": {"name": "EPSG:4269"}}`); without it
//! coordinates are taken as WGS84 longitude/latitude.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, BoundaryLayer, Feature};
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection {
        features: Vec<RawFeature>,
        #[serde(default)]
        crs: Option<NamedCrs>,
    },
    Feature(RawFeature),
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
        #[serde(default)]
        crs: Option<NamedCrs>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
        #[serde(default)]
        crs: Option<NamedCrs>,
    },
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    crs: Option<NamedCrs>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Point { coordinates: Vec<f64> },
    LineString { coordinates: Vec<Vec<f64>> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct NamedCrs {
    properties: NamedCrsProperties,
}

#[derive(Debug, Deserialize)]
struct NamedCrsProperties {
    name: String,
}

/// Read a GeoJSON file into a boundary layer
pub fn read_boundary_layer<P: AsRef<Path>>(path: P) -> Result<BoundaryLayer> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let layer = parse_boundary_layer(&text)?;
    debug!(
        "Read {} boundary features from {} ({})",
        layer.len(),
        path.display(),
        layer.crs()
    );
    Ok(layer)
}

/// Parse GeoJSON text into a boundary layer
pub fn parse_boundary_layer(text: &str) -> Result<BoundaryLayer> {
    let document: Document = serde_json::from_str(text)?;

    let (features, crs) = match document {
        Document::FeatureCollection { features, crs } => {
            let features = features
                .into_iter()
                .map(convert_feature)
                .collect::<Result<Vec<_>>>()?;
            (features, crs)
        }
        Document::Feature(mut raw) => {
            let crs = raw.crs.take();
            (vec![convert_feature(raw)?], crs)
        }
        Document::Polygon { coordinates, crs } => {
            let poly = polygon_from(&coordinates)?;
            (vec![Feature::new(Geometry::Polygon(poly))], crs)
        }
        Document::MultiPolygon { coordinates, crs } => {
            let mp = multipolygon_from(&coordinates)?;
            (vec![Feature::new(Geometry::MultiPolygon(mp))], crs)
        }
    };

    let crs = match crs {
        Some(named) => CRS::from_name(&named.properties.name),
        None => CRS::wgs84(),
    };

    Ok(BoundaryLayer::new(features, crs))
}

fn convert_feature(raw: RawFeature) -> Result<Feature> {
    let geometry = match raw.geometry {
        Some(g) => convert_geometry(g)?,
        None => None,
    };

    let properties = raw
        .properties
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, attribute_from(v)))
        .collect();

    let id = raw.id.map(|v| match v {
        Value::String(s) => s,
        other => other.to_string(),
    });

    Ok(Feature {
        geometry,
        properties,
        id,
    })
}

fn convert_geometry(raw: RawGeometry) -> Result<Option<Geometry<f64>>> {
    let geometry = match raw {
        RawGeometry::Point { coordinates } => Geometry::Point(Point::from(coord_from(&coordinates)?)),
        RawGeometry::LineString { coordinates } => {
            Geometry::LineString(ring_from(&coordinates)?)
        }
        RawGeometry::Polygon { coordinates } => Geometry::Polygon(polygon_from(&coordinates)?),
        RawGeometry::MultiPolygon { coordinates } => {
            Geometry::MultiPolygon(multipolygon_from(&coordinates)?)
        }
        RawGeometry::Unsupported => {
            warn!("Skipping unsupported GeoJSON geometry type");
            return Ok(None);
        }
    };
    Ok(Some(geometry))
}

fn attribute_from(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => AttributeValue::String(s),
        other => AttributeValue::String(other.to_string()),
    }
}

fn coord_from(position: &[f64]) -> Result<Coord<f64>> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(Error::InvalidGeometry(format!(
            "position needs at least 2 values, got {}",
            position.len()
        ))),
    }
}

fn ring_from(positions: &[Vec<f64>]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|p| coord_from(p))
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn polygon_from(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| Error::InvalidGeometry("polygon without rings".into()))?;
    let exterior = ring_from(exterior)?;
    let interiors = interiors
        .iter()
        .map(|r| ring_from(r))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn multipolygon_from(polygons: &[Vec<Vec<Vec<f64>>>]) -> Result<MultiPolygon<f64>> {
    polygons
        .iter()
        .map(|p| polygon_from(p))
        .collect::<Result<Vec<_>>>()
        .map(MultiPolygon::new)
}
