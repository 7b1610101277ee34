//! Vector data: features read from disk and the zones suitability is
//! aggregated over.

mod geojson;

pub use geojson::{parse_feature_collection, read_feature_collection};

use crate::error::{Error, Result};
use geo_types::{Geometry, MultiPolygon};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

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
    /// Numeric view of the attribute, if it holds a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text form, used for identifiers and names
    pub fn as_text(&self) -> Option<String> {
        match self {
            AttributeValue::Null => None,
            AttributeValue::Bool(b) => Some(b.to_string()),
            AttributeValue::Int(i) => Some(i.to_string()),
            AttributeValue::Float(f) => Some(f.to_string()),
            AttributeValue::String(s) => Some(s.clone()),
        }
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub properties: HashMap<String, AttributeValue>,
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

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
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
}

/// A named polygonal region with a known total area.
///
/// Zones are read-only inputs to suitability evaluation; the summary for a
/// zone reports suitable area relative to `total_area_km2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    /// Total area of the zone in km², as provided by the vector source
    pub total_area_km2: f64,
}

impl Zone {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        geometry: MultiPolygon<f64>,
        total_area_km2: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            geometry,
            total_area_km2,
        }
    }
}

/// Which feature properties hold the zone identifier, name and area.
#[derive(Debug, Clone)]
pub struct ZoneFields {
    /// Property used as zone id. Falls back to the feature id, then to the
    /// feature's position in the collection.
    pub id: String,
    /// Property used as display name. Falls back to the id.
    pub name: String,
    /// Property holding a precomputed area in km², if the source has one.
    pub area_km2: Option<String>,
}

impl Default for ZoneFields {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            name: "name".to_string(),
            area_km2: None,
        }
    }
}

/// A zone as read from a feature collection, before its area is known.
#[derive(Debug, Clone)]
pub struct ZoneRecord {
    pub id: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    pub area_km2: Option<f64>,
}

impl ZoneRecord {
    /// Finish the record into a [`Zone`], computing the area with
    /// `compute_area` when the source did not provide one.
    pub fn into_zone<F>(self, compute_area: F) -> Zone
    where
        F: FnOnce(&MultiPolygon<f64>) -> f64,
    {
        let area = match self.area_km2 {
            Some(a) => a,
            None => compute_area(&self.geometry),
        };
        Zone::new(self.id, self.name, self.geometry, area)
    }
}

/// Extract zone records from polygonal features.
///
/// Features without geometry are skipped; non-polygonal geometry is an error.
pub fn zone_records(collection: &FeatureCollection, fields: &ZoneFields) -> Result<Vec<ZoneRecord>> {
    let mut records = Vec::with_capacity(collection.len());

    for (index, feature) in collection.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let geometry = match geometry {
            Geometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
            Geometry::MultiPolygon(mp) => mp.clone(),
            other => {
                return Err(Error::Vector(format!(
                    "feature {} has non-polygonal geometry ({})",
                    index,
                    geometry_kind(other)
                )))
            }
        };

        let id = feature
            .get_property(&fields.id)
            .and_then(AttributeValue::as_text)
            .or_else(|| feature.id.clone())
            .unwrap_or_else(|| index.to_string());
        let name = feature
            .get_property(&fields.name)
            .and_then(AttributeValue::as_text)
            .unwrap_or_else(|| id.clone());
        let area_km2 = match &fields.area_km2 {
            Some(key) => Some(
                feature
                    .get_property(key)
                    .and_then(AttributeValue::as_f64)
                    .ok_or_else(|| {
                        Error::Vector(format!("feature '{}' has no numeric '{}' property", id, key))
                    })?,
            ),
            None => None,
        };

        records.push(ZoneRecord {
            id,
            name,
            geometry,
            area_km2,
        });
    }

    Ok(records)
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
