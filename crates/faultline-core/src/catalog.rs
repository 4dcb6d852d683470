//! Fault catalog loading and geometry extraction.
//!
//! The extractor normalizes heterogeneous GeoJSON fault geometries into
//! flat [`FaultFeature`] rows. Features whose geometry cannot be parsed
//! are dropped with a warning, never a hard error; the drop count is
//! surfaced so callers can report it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use geojson::{FeatureCollection, GeoJson, Value};

use crate::error::{FaultlineError, Result};
use crate::models::{CoordPayload, FaultFeature, GeometryType, PropertyValue};

/// Result of extracting a catalog into flat feature rows.
///
/// `features` preserves catalog order; `source_indices[i]` is the position
/// of `features[i]` in the original collection, so the raw document can be
/// subset for pass-through rendering.
#[derive(Debug, Clone)]
pub struct FeatureExtraction {
    pub features: Vec<FaultFeature>,
    pub source_indices: Vec<usize>,
    pub dropped: usize,
}

/// Load the fault catalog document from a GeoJSON file.
pub fn load_catalog(path: &Path) -> Result<FeatureCollection> {
    if !path.exists() {
        return Err(FaultlineError::CatalogNotFound { path: path.to_path_buf() });
    }

    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content
        .parse()
        .map_err(|e| FaultlineError::CatalogParse { reason: format!("{}", e) })?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => Err(FaultlineError::CatalogNotCollection),
    }
}

/// Normalize a loaded catalog into flat attribute rows.
///
/// The row index in `features` is the feature's identity for all
/// downstream joins until the bounding-box filter re-indexes the kept
/// subsequence.
pub fn extract_features(collection: &FeatureCollection) -> FeatureExtraction {
    let mut features = Vec::with_capacity(collection.features.len());
    let mut source_indices = Vec::with_capacity(collection.features.len());
    let mut dropped = 0usize;

    for (idx, feature) in collection.features.iter().enumerate() {
        match convert_feature(feature) {
            Some(row) => {
                features.push(row);
                source_indices.push(idx);
            }
            None => {
                tracing::warn!(feature_index = idx, "dropping feature with unusable geometry");
                dropped += 1;
            }
        }
    }

    tracing::info!(
        total = collection.features.len(),
        extracted = features.len(),
        dropped,
        "extracted fault catalog"
    );

    FeatureExtraction { features, source_indices, dropped }
}

fn convert_feature(feature: &geojson::Feature) -> Option<FaultFeature> {
    let geometry = feature.geometry.as_ref()?;

    let (geometry_type, coords) = match &geometry.value {
        Value::Point(pair) => (GeometryType::Point, CoordPayload::Single(as_pair(pair)?)),
        Value::LineString(vertices) => {
            (GeometryType::LineString, CoordPayload::Sequence(as_pairs(vertices)?))
        }
        Value::MultiPoint(vertices) => {
            (GeometryType::MultiPoint, CoordPayload::Sequence(as_pairs(vertices)?))
        }
        Value::Polygon(rings) => {
            let converted: Option<Vec<Vec<[f64; 2]>>> =
                rings.iter().map(|ring| as_pairs(ring)).collect();
            (GeometryType::Polygon, CoordPayload::Rings(converted?))
        }
        _ => return None,
    };

    let mut properties: HashMap<String, PropertyValue> = feature
        .properties
        .as_ref()
        .map(|props| {
            props.iter().map(|(k, v)| (k.clone(), PropertyValue::from_json(v))).collect()
        })
        .unwrap_or_default();
    properties.insert("geometry_type".to_string(), PropertyValue::Text(geometry_type.to_string()));

    Some(FaultFeature { geometry_type, coords, properties })
}

fn as_pair(position: &[f64]) -> Option<[f64; 2]> {
    if position.len() >= 2 {
        Some([position[0], position[1]])
    } else {
        None
    }
}

fn as_pairs(positions: &[Vec<f64>]) -> Option<Vec<[f64; 2]>> {
    positions.iter().map(|p| as_pair(p)).collect()
}
