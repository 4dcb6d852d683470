//! Seismic event records.

use crate::models::fault::PropertyValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single seismic event as produced by the bulletin parser.
///
/// Never mutated after creation; enrichment produces a new
/// [`EnrichedEvent`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Parseable date-time string, kept verbatim from the bulletin.
    pub timestamp: String,
    /// Free-text location; may embed a city name in trailing parentheses.
    pub location: String,
    pub magnitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Hypocenter depth in kilometers.
    pub depth_km: f64,
}

/// An [`Event`] plus the fields derived by the enrichment pipeline.
///
/// `closest_fault_idx` indexes into the bounding-box-filtered fault
/// collection, not the full catalog. Distances are absent when no fault
/// could be matched or its coordinates could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub city: Option<String>,
    pub closest_fault_idx: Option<usize>,
    pub distance_to_fault_m: Option<f64>,
    /// Meters / 1000, rounded to 2 decimal places.
    pub distance_to_fault_km: Option<f64>,
    /// Properties joined from the matched fault feature, including its
    /// `geometry_type`. Empty when the event has no match.
    #[serde(default)]
    pub fault_properties: HashMap<String, PropertyValue>,
}

impl EnrichedEvent {
    /// Seed an enriched record from a raw event, with no derived fields set.
    pub fn from_event(event: Event) -> Self {
        Self {
            event,
            city: None,
            closest_fault_idx: None,
            distance_to_fault_m: None,
            distance_to_fault_km: None,
            fault_properties: HashMap::new(),
        }
    }
}
