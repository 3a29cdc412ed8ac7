//! A single selected boundary polygon and the attribute filter that picks it

use super::{AttributeValue, Feature};
use crate::crs::CRS;
use crate::error::{Error, Result};
use geo::{BoundingRect, MapCoords};
use geo_types::{Coord, Geometry, MultiPolygon};
use std::collections::HashMap;
use std::fmt;

/// Exact-match attribute filter, every criterion must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    criteria: Vec<(String, String)>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `field == value` criterion
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.criteria.push((name.into(), value.into()));
        self
    }

    pub fn criteria(&self) -> &[(String, String)] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub(crate) fn matches(&self, feature: &Feature) -> bool {
        self.criteria.iter().all(|(name, value)| {
            feature
                .get_property(name)
                .map_or(false, |attr| attr.matches(value))
        })
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.criteria.is_empty() {
            return f.write_str("<all features>");
        }
        for (i, (name, value)) in self.criteria.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{name} = '{value}'")?;
        }
        Ok(())
    }
}

/// The polygon used to clip rasters, together with its CRS.
#[derive(Debug, Clone)]
pub struct Boundary {
    geometry: MultiPolygon<f64>,
    crs: CRS,
    properties: HashMap<String, AttributeValue>,
}

impl Boundary {
    pub fn new(geometry: MultiPolygon<f64>, crs: CRS) -> Self {
        Self {
            geometry,
            crs,
            properties: HashMap::new(),
        }
    }

    pub(crate) fn from_feature(feature: &Feature, crs: CRS) -> Result<Self> {
        let geometry = match &feature.geometry {
            Some(Geometry::Polygon(p)) => MultiPolygon::new(vec![p.clone()]),
            Some(Geometry::MultiPolygon(mp)) => mp.clone(),
            Some(other) => {
                return Err(Error::InvalidGeometry(format!(
                    "boundary must be a polygon, got {}",
                    geometry_kind(other)
                )))
            }
            None => return Err(Error::InvalidGeometry("feature has no geometry".into())),
        };

        Ok(Self {
            geometry,
            crs,
            properties: feature.properties.clone(),
        })
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    pub fn crs(&self) -> &CRS {
        &self.crs
    }

    pub fn property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Bounding box (min_x, min_y, max_x, max_y), `None` for an empty polygon
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|r| (r.min().x, r.min().y, r.max().x, r.max().y))
    }

    /// Same boundary with every vertex passed through `f`, tagged with `crs`
    pub fn map_coords<F>(&self, crs: CRS, f: F) -> Result<Boundary>
    where
        F: Fn(f64, f64) -> Result<(f64, f64)>,
    {
        let geometry = self
            .geometry
            .try_map_coords(|c: Coord<f64>| f(c.x, c.y).map(|(x, y)| Coord { x, y }))?;

        Ok(Boundary {
            geometry,
            crs,
            properties: self.properties.clone(),
        })
    }
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;

    fn square() -> Boundary {
        let poly = polygon![
            (x: 1.0, y: 2.0), (x: 4.0, y: 2.0), (x: 4.0, y: 6.0), (x: 1.0, y: 6.0), (x: 1.0, y: 2.0),
        ];
        Boundary::new(MultiPolygon::new(vec![poly]), CRS::wgs84())
    }

    #[test]
    fn bounds_of_square() {
        assert_eq!(square().bounds(), Some((1.0, 2.0, 4.0, 6.0)));
    }

    #[test]
    fn empty_boundary_has_no_bounds() {
        let empty = Boundary::new(MultiPolygon::new(vec![]), CRS::wgs84());
        assert_eq!(empty.bounds(), None);
    }

    #[test]
    fn map_coords_moves_every_vertex() {
        let shifted = square()
            .map_coords(CRS::web_mercator(), |x, y| Ok((x * 10.0, y + 1.0)))
            .unwrap();
        assert_eq!(shifted.bounds(), Some((10.0, 3.0, 40.0, 7.0)));
        assert_eq!(shifted.crs().epsg(), Some(3857));
    }

    #[test]
    fn map_coords_moves_holes_too() {
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 8.0, y: 0.0), (x: 8.0, y: 8.0), (x: 0.0, y: 8.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 2.0, y: 2.0), (x: 4.0, y: 2.0), (x: 4.0, y: 4.0), (x: 2.0, y: 4.0), (x: 2.0, y: 2.0)]]
        );
        let boundary = Boundary::new(MultiPolygon::new(vec![poly]), CRS::wgs84());
        let shifted = boundary
            .map_coords(CRS::wgs84(), |x, y| Ok((x + 100.0, y - 100.0)))
            .unwrap();

        let polygon = &shifted.geometry().0[0];
        assert_eq!(polygon.exterior().0[2], Coord { x: 108.0, y: -92.0 });
        assert_eq!(polygon.interiors().len(), 1);
        assert_eq!(polygon.interiors()[0].0[0], Coord { x: 102.0, y: -98.0 });
    }

    #[test]
    fn map_coords_propagates_errors() {
        let result = square().map_coords(CRS::web_mercator(), |_, _| {
            Err(Error::Other("boom".into()))
        });
        assert!(result.is_err());
    }

    #[test]
    fn selection_display() {
        let sel = Selection::new().field("NAME", "Wake").field("STATE_ABBR", "NC");
        assert_eq!(sel.to_string(), "NAME = 'Wake' AND STATE_ABBR = 'NC'");
        assert_eq!(Selection::new().to_string(), "<all features>");
    }
}
