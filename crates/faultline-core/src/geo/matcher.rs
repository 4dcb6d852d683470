//! Planar nearest-feature search.
//!
//! Ranks candidates by Euclidean distance in raw (lng, lat) degree space.
//! The planar distance is only used for ranking; the reported geodesic
//! distance is computed separately in [`crate::geo::geodesic`].

use crate::models::FaultFeature;

/// Outcome of the nearest-feature search for one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Index into the bounding-box-filtered fault collection.
    pub closest_idx: Option<usize>,
    /// Planar ranking distance in degree space; infinite when unmatched.
    pub planar_distance: f64,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self { closest_idx: None, planar_distance: f64::INFINITY }
    }
}

/// Find the fault feature closest to an event, planar, single pass.
///
/// Candidates without a derivable ranking point are excluded. Ties resolve
/// to the first occurrence in filtered order (stable argmin). An empty or
/// entirely coordinate-less candidate set yields a no-match result; this
/// never fails, because one bad feature must not abort the whole batch.
pub fn find_closest_fault(latitude: f64, longitude: f64, faults: &[FaultFeature]) -> MatchResult {
    let mut best = MatchResult::no_match();

    for (idx, fault) in faults.iter().enumerate() {
        let Some([lng, lat]) = fault.ranking_point() else {
            continue;
        };

        let d_lng = longitude - lng;
        let d_lat = latitude - lat;
        let distance = (d_lng * d_lng + d_lat * d_lat).sqrt();

        if distance < best.planar_distance {
            best = MatchResult { closest_idx: Some(idx), planar_distance: distance };
        }
    }

    best
}
