//! Whole-degree bounding box over the event set and the coarse fault
//! pre-filter built on it.

use serde::{Deserialize, Serialize};

use crate::error::{FaultlineError, Result};
use crate::models::{CoordPayload, Event, FaultFeature};

/// Coordinate envelope of an event set, rounded outward to whole degrees.
///
/// The outward rounding tolerates sparse sampling near the box edge.
/// Invariant: min <= max on both axes; a single event degenerates to a
/// one-degree box around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Compute the floor/ceil envelope of an event set.
    pub fn from_events(events: &[Event]) -> Result<Self> {
        if events.is_empty() {
            return Err(FaultlineError::EmptyEventSet);
        }

        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lng = f64::INFINITY;
        let mut max_lng = f64::NEG_INFINITY;

        for event in events {
            min_lat = min_lat.min(event.latitude);
            max_lat = max_lat.max(event.latitude);
            min_lng = min_lng.min(event.longitude);
            max_lng = max_lng.max(event.longitude);
        }

        Ok(Self {
            min_lat: min_lat.floor(),
            max_lat: max_lat.ceil(),
            min_lng: min_lng.floor(),
            max_lng: max_lng.ceil(),
        })
    }

    /// Inclusive containment test for a `[lng, lat]` pair.
    pub fn contains(&self, pair: [f64; 2]) -> bool {
        let [lng, lat] = pair;
        self.min_lat <= lat && lat <= self.max_lat && self.min_lng <= lng && lng <= self.max_lng
    }
}

/// Retain the fault features intersecting the box, order preserved.
///
/// This is a coarse accept/reject test: a feature passes if any of its
/// vertices lies in the box. Geometry is never clipped. Returns the kept
/// positions (indices into the input slice) plus the count of features
/// skipped because they carried no vertices at all.
pub fn filter_by_bounds(features: &[FaultFeature], bbox: &BoundingBox) -> (Vec<usize>, usize) {
    let mut kept = Vec::new();
    let mut skipped = 0usize;

    for (idx, feature) in features.iter().enumerate() {
        match feature_intersects(feature, bbox) {
            Some(true) => kept.push(idx),
            Some(false) => {}
            None => skipped += 1,
        }
    }

    tracing::info!(total = features.len(), kept = kept.len(), skipped, "bounding-box filter");

    (kept, skipped)
}

/// `None` means the feature could not be inspected (no vertices).
fn feature_intersects(feature: &FaultFeature, bbox: &BoundingBox) -> Option<bool> {
    match &feature.coords {
        CoordPayload::Single(pair) => Some(bbox.contains(*pair)),
        CoordPayload::Sequence(vertices) => {
            if vertices.is_empty() {
                return None;
            }
            Some(vertices.iter().any(|v| bbox.contains(*v)))
        }
        CoordPayload::Rings(rings) => {
            if rings.iter().all(|ring| ring.is_empty()) {
                return None;
            }
            Some(rings.iter().any(|ring| ring.iter().any(|v| bbox.contains(*v))))
        }
    }
}
