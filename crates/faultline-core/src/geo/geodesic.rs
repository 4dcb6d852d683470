//! Great-circle distance between an event and its matched fault.

use std::collections::HashMap;

use crate::models::{CoordPayload, FaultFeature};

/// Mean Earth radius in meters, as used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance in meters between two (lat, lng)
/// points given in degrees.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Round a meter distance to kilometers with 2 decimal places.
pub fn round_km(meters: f64) -> f64 {
    (meters / 1000.0 * 100.0).round() / 100.0
}

/// Build the feature-index -> (lat, lng) lookup used for geodesic
/// distances, shared read-only across all per-event computations.
///
/// The position is the first resolvable coordinate found by descending
/// into the nested payload until a flat pair is reached. This descent is
/// independent of the planar ranking point used by the matcher; for the
/// geometry types in the catalog the two coincide, but the resolution
/// rules are kept separate on purpose.
pub fn representative_points(faults: &[FaultFeature]) -> HashMap<usize, (f64, f64)> {
    let mut lookup = HashMap::new();
    for (idx, fault) in faults.iter().enumerate() {
        if let Some([lng, lat]) = first_resolvable_pair(&fault.coords) {
            lookup.insert(idx, (lat, lng));
        }
    }
    lookup
}

/// Descend first-element-first until a flat `[lng, lat]` pair is found.
fn first_resolvable_pair(coords: &CoordPayload) -> Option<[f64; 2]> {
    match coords {
        CoordPayload::Single(pair) => Some(*pair),
        CoordPayload::Sequence(vertices) => vertices.first().copied(),
        CoordPayload::Rings(rings) => rings.first().and_then(|ring| ring.first()).copied(),
    }
}
