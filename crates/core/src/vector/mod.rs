//! Boundary layers: administrative polygons with attributes

mod boundary;

pub use boundary::{Boundary, Selection};

use crate::crs::CRS;
use crate::error::{Error, Result};
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Exact match against the textual form of a selection value.
    ///
    /// Strings compare verbatim (case and whitespace included); numbers
    /// compare by their display form, so `Int(37)` matches `"37"`.
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            AttributeValue::Null => false,
            AttributeValue::String(s) => s == expected,
            AttributeValue::Int(i) => expected.trim().parse::<i64>().map_or(false, |v| v == *i),
            AttributeValue::Float(f) => expected.trim().parse::<f64>().map_or(false, |v| v == *f),
            AttributeValue::Bool(b) => expected.trim().parse::<bool>().map_or(false, |v| v == *b),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => f.write_str("null"),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Int(i) => write!(f, "{i}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::String(s) => f.write_str(s),
        }
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Builder-style attribute setter
    pub fn with_property(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.set_property(key, value);
        self
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }
}

/// A collection of boundary features sharing one CRS, e.g. all US counties.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    features: Vec<Feature>,
    crs: CRS,
}

impl BoundaryLayer {
    pub fn new(features: Vec<Feature>, crs: CRS) -> Self {
        Self { features, crs }
    }

    pub fn crs(&self) -> &CRS {
        &self.crs
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// Select the single feature matching every criterion of `selection`.
    ///
    /// Fails with [`Error::NoMatchingGeometry`] when nothing matches and with
    /// [`Error::AmbiguousGeometry`] when more than one feature does.
    pub fn select(&self, selection: &Selection) -> Result<Boundary> {
        let mut matches = self.features.iter().filter(|f| selection.matches(f));

        let Some(feature) = matches.next() else {
            return Err(Error::NoMatchingGeometry {
                criteria: selection.to_string(),
            });
        };

        let extra = matches.count();
        if extra > 0 {
            return Err(Error::AmbiguousGeometry {
                criteria: selection.to_string(),
                count: extra + 1,
            });
        }

        debug!("Selected boundary feature {:?} for {}", feature.id, selection);
        Boundary::from_feature(feature, self.crs.clone())
    }
}
