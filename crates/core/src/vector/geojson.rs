//! Minimal GeoJSON reader.
//!
//! Covers the subset needed for zone layers: a `FeatureCollection` of
//! `Polygon` / `MultiPolygon` features with scalar properties. Point and line
//! geometries are read too, so callers can reject them by kind; geometry
//! collections and unknown types are a vector error. Coordinates are
//! taken as-is; no CRS handling (RFC 7946 says lon/lat WGS84, but projected
//! exports are accepted as long as they match the rasters).

use super::{AttributeValue, Feature, FeatureCollection};
use crate::error::{Error, Result};
use geo_types::{
    Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    geometry: Option<GeometryDoc>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeometryDoc {
    Known(RawGeometry),
    Other {
        #[serde(rename = "type")]
        kind: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum RawGeometry {
    Point([f64; 2]),
    MultiPoint(Vec<[f64; 2]>),
    LineString(Vec<[f64; 2]>),
    MultiLineString(Vec<Vec<[f64; 2]>>),
    Polygon(Vec<Vec<[f64; 2]>>),
    MultiPolygon(Vec<Vec<Vec<[f64; 2]>>>),
}

const COORDINATE_TYPES: &[&str] = &[
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
];

/// Read a GeoJSON `FeatureCollection` from a file
pub fn read_feature_collection<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_feature_collection(&text)
}

/// Parse a GeoJSON `FeatureCollection` from a string
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    let raw: RawCollection = serde_json::from_str(text)?;
    if raw.kind != "FeatureCollection" {
        return Err(Error::Vector(format!(
            "expected a FeatureCollection, found '{}'",
            raw.kind
        )));
    }

    let mut collection = FeatureCollection::new();
    for raw_feature in raw.features {
        collection.push(convert_feature(raw_feature)?);
    }
    Ok(collection)
}

fn convert_feature(raw: RawFeature) -> Result<Feature> {
    let properties: HashMap<String, AttributeValue> = raw
        .properties
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, convert_value(v)))
        .collect();

    let id = raw.id.map(|v| match v {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });

    Ok(Feature {
        geometry: raw.geometry.map(convert_geometry).transpose()?,
        properties,
        id,
    })
}

fn convert_value(value: serde_json::Value) -> AttributeValue {
    match value {
        serde_json::Value::Null => AttributeValue::Null,
        serde_json::Value::Bool(b) => AttributeValue::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => n.as_f64().map_or(AttributeValue::Null, AttributeValue::Float),
        },
        serde_json::Value::String(s) => AttributeValue::String(s),
        other => AttributeValue::String(other.to_string()),
    }
}

fn convert_geometry(doc: GeometryDoc) -> Result<Geometry<f64>> {
    let raw = match doc {
        GeometryDoc::Known(raw) => raw,
        GeometryDoc::Other { kind } if COORDINATE_TYPES.contains(&kind.as_str()) => {
            return Err(Error::Vector(format!("malformed {} coordinates", kind)))
        }
        GeometryDoc::Other { kind } => {
            return Err(Error::Vector(format!("unsupported geometry type '{}'", kind)))
        }
    };

    Ok(match raw {
        RawGeometry::Point([x, y]) => Geometry::Point(Point::new(x, y)),
        RawGeometry::MultiPoint(points) => Geometry::MultiPoint(MultiPoint::new(
            points.into_iter().map(|[x, y]| Point::new(x, y)).collect(),
        )),
        RawGeometry::LineString(line) => Geometry::LineString(convert_line(line)),
        RawGeometry::MultiLineString(lines) => Geometry::MultiLineString(MultiLineString::new(
            lines.into_iter().map(convert_line).collect(),
        )),
        RawGeometry::Polygon(rings) => Geometry::Polygon(convert_polygon(rings)?),
        RawGeometry::MultiPolygon(polys) => Geometry::MultiPolygon(MultiPolygon::new(
            polys
                .into_iter()
                .map(convert_polygon)
                .collect::<Result<Vec<_>>>()?,
        )),
    })
}

fn convert_polygon(rings: Vec<Vec<[f64; 2]>>) -> Result<Polygon<f64>> {
    let mut rings = rings.into_iter().map(convert_ring);
    let exterior = rings
        .next()
        .ok_or_else(|| Error::Vector("polygon without an exterior ring".into()))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn convert_line(line: Vec<[f64; 2]>) -> LineString<f64> {
    LineString::new(line.into_iter().map(|[x, y]| Coord { x, y }).collect())
}

fn convert_ring(ring: Vec<[f64; 2]>) -> Result<LineString<f64>> {
    if ring.len() < 3 {
        return Err(Error::Vector(format!(
            "polygon ring needs at least 3 positions, got {}",
            ring.len()
        )));
    }
    Ok(convert_line(ring))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ZONES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": 7,
                "properties": { "rgn": "Oregon", "rgn_id": 1, "area_km2": 179994.1 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-125.0, 42.0], [-124.0, 42.0], [-124.0, 46.0], [-125.0, 46.0], [-125.0, 42.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "rgn": "Washington", "flag": true, "note": null },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-125.0, 46.0], [-124.0, 46.0], [-124.0, 48.0], [-125.0, 46.0]]],
                        [[[-123.0, 47.0], [-122.5, 47.0], [-122.5, 48.0], [-123.0, 47.0]]]
                    ]
                }
            },
            { "type": "Feature", "properties": {}, "geometry": null }
        ]
    }"#;

    #[test]
    fn test_parse_collection() {
        let fc = parse_feature_collection(ZONES).unwrap();
        assert_eq!(fc.len(), 3);

        let oregon = &fc.features[0];
        assert_eq!(oregon.id.as_deref(), Some("7"));
        assert_eq!(
            oregon.get_property("rgn"),
            Some(&AttributeValue::String("Oregon".into()))
        );
        assert_eq!(oregon.get_property("rgn_id"), Some(&AttributeValue::Int(1)));
        assert!(matches!(oregon.geometry, Some(Geometry::Polygon(_))));

        let washington = &fc.features[1];
        match &washington.geometry {
            Some(Geometry::MultiPolygon(mp)) => assert_eq!(mp.0.len(), 2),
            other => panic!("expected MultiPolygon, got {:?}", other),
        }
        assert_eq!(washington.get_property("note"), Some(&AttributeValue::Null));

        assert!(fc.features[2].geometry.is_none());
    }

    #[test]
    fn test_read_from_file() {
        let mut tmp = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        tmp.write_all(ZONES.as_bytes()).unwrap();
        let fc = read_feature_collection(tmp.path()).unwrap();
        assert_eq!(fc.len(), 3);
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = parse_feature_collection(r#"{"type": "Feature", "features": []}"#).unwrap_err();
        assert!(matches!(err, Error::Vector(_)));
    }

    #[test]
    fn test_reads_line_geometry() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {},
             "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}}
        ]}"#;
        let fc = parse_feature_collection(text).unwrap();
        match &fc.features[0].geometry {
            Some(Geometry::LineString(ls)) => assert_eq!(ls.0.len(), 2),
            other => panic!("expected LineString, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_geometry_is_vector_error() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {},
             "geometry": {"type": "GeometryCollection", "geometries": []}}
        ]}"#;
        let err = parse_feature_collection(text).unwrap_err();
        assert!(matches!(err, Error::Vector(ref m) if m.contains("GeometryCollection")));

        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": "nope"}}
        ]}"#;
        let err = parse_feature_collection(text).unwrap_err();
        assert!(matches!(err, Error::Vector(ref m) if m.contains("malformed Polygon")));
    }

    #[test]
    fn test_rejects_degenerate_ring() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 1.0]]]}}
        ]}"#;
        assert!(parse_feature_collection(text).is_err());
    }
}
