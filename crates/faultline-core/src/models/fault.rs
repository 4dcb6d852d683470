//! Fault catalog features and their open property maps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Geometry kinds the catalog extractor understands. Anything else is
/// dropped during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    LineString,
    MultiPoint,
    Polygon,
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::Polygon => "Polygon",
        };
        f.write_str(name)
    }
}

/// Representative coordinate payload of a fault feature.
///
/// Coordinates are stored as `[lng, lat]` pairs, GeoJSON axis order.
/// Nested structures are kept nested; later stages resolve them to a
/// single representative point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordPayload {
    /// Point geometry: one pair.
    Single([f64; 2]),
    /// LineString / MultiPoint: ordered vertex sequence.
    Sequence(Vec<[f64; 2]>),
    /// Polygon: ordered rings, each an ordered vertex sequence.
    Rings(Vec<Vec<[f64; 2]>>),
}

/// A catalog attribute value. Explicit tagged scalars instead of raw JSON
/// so downstream lookups never need reflection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Already-structured numeric sequence, e.g. a dip range.
    Sequence(Vec<f64>),
}

impl PropertyValue {
    /// Convert a raw GeoJSON property into a tagged value. Arrays that are
    /// not purely numeric and nested objects degrade to their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PropertyValue::Null,
            serde_json::Value::Bool(b) => PropertyValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => PropertyValue::Number(f),
                None => PropertyValue::Text(n.to_string()),
            },
            serde_json::Value::String(s) => PropertyValue::Text(s.clone()),
            serde_json::Value::Array(items) => {
                let numbers: Option<Vec<f64>> = items.iter().map(|v| v.as_f64()).collect();
                match numbers {
                    Some(seq) => PropertyValue::Sequence(seq),
                    None => PropertyValue::Text(value.to_string()),
                }
            }
            serde_json::Value::Object(_) => PropertyValue::Text(value.to_string()),
        }
    }
}

/// One fault catalog entry: geometry plus an open property map.
///
/// Identity is positional: a feature is identified by its index in the
/// collection it lives in, and all downstream joins use that index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultFeature {
    pub geometry_type: GeometryType,
    pub coords: CoordPayload,
    pub properties: HashMap<String, PropertyValue>,
}

impl FaultFeature {
    /// The planar ranking point: a flat pair is used directly; nested
    /// payloads use the first vertex of the first sub-structure. This is a
    /// deliberate simplification, not the nearest vertex.
    pub fn ranking_point(&self) -> Option<[f64; 2]> {
        match &self.coords {
            CoordPayload::Single(pair) => Some(*pair),
            CoordPayload::Sequence(vertices) => vertices.first().copied(),
            CoordPayload::Rings(rings) => rings.first().and_then(|ring| ring.first()).copied(),
        }
    }
}
