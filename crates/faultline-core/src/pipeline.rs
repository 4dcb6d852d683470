//! The enrichment pipeline: a strict sequential chain of stages, each
//! consuming its predecessor's table and returning a new one.
//!
//! Stage order: geometry extraction -> bounding-box filter -> nearest
//! feature matching -> geodesic distance -> attribute normalization ->
//! temporal filter. No stage mutates shared state; the filtered fault
//! table and the representative-point lookup are built once and shared
//! read-only across all per-event computations.

use chrono::NaiveDate;
use geojson::FeatureCollection;

use crate::catalog::extract_features;
use crate::config::LayeredConfig;
use crate::error::Result;
use crate::geo::bbox::{filter_by_bounds, BoundingBox};
use crate::geo::geodesic::{haversine_m, representative_points, round_km};
use crate::geo::matcher::find_closest_fault;
use crate::models::{EnrichedEvent, Event, FaultFeature, PropertyValue};
use crate::normalize::{extract_city, normalize_attributes};
use crate::temporal::apply_interval_policy;

/// Per-stage drop/skip counts, surfaced for observability instead of the
/// silent failure swallowing the processing stages do internally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageReport {
    pub events_in: usize,
    pub catalog_features: usize,
    pub dropped_geometries: usize,
    pub filtered_features: usize,
    pub filter_skipped: usize,
    pub matched_events: usize,
    pub unmatched_events: usize,
    pub missing_distances: usize,
    pub events_out: usize,
}

/// Everything the external visualizer consumes.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The enriched, time-filtered event table.
    pub events: Vec<EnrichedEvent>,
    /// The bounding-box-filtered fault table; `closest_fault_idx` on every
    /// event indexes into this collection.
    pub faults: Vec<FaultFeature>,
    /// The filtered subset of the raw catalog document, passed through
    /// unchanged for rendering.
    pub filtered_collection: FeatureCollection,
    /// The original catalog document, passed through unchanged.
    pub document: FeatureCollection,
    pub bbox: BoundingBox,
    /// Pass-through for the visualizer's marker styling.
    pub high_mag_threshold: f64,
    pub report: StageReport,
}

/// Run the full enrichment pipeline over an already-materialized event
/// table and fault catalog document.
///
/// `today` anchors the recent-window interval policy so runs are
/// reproducible in tests; callers normally pass the current local date.
pub fn run_pipeline(
    events: Vec<Event>,
    catalog: FeatureCollection,
    config: &LayeredConfig,
    today: NaiveDate,
) -> Result<PipelineOutput> {
    let mut report = StageReport { events_in: events.len(), ..Default::default() };

    // Stage 1: geometry extraction
    let extraction = extract_features(&catalog);
    report.catalog_features = catalog.features.len();
    report.dropped_geometries = extraction.dropped;

    // Stage 2: bounding-box filter
    let bbox = BoundingBox::from_events(&events)?;
    let (kept, filter_skipped) = filter_by_bounds(&extraction.features, &bbox);
    report.filter_skipped = filter_skipped;
    report.filtered_features = kept.len();

    let faults: Vec<FaultFeature> =
        kept.iter().map(|&i| extraction.features[i].clone()).collect();
    let filtered_collection = FeatureCollection {
        bbox: None,
        features: kept
            .iter()
            .map(|&i| catalog.features[extraction.source_indices[i]].clone())
            .collect(),
        foreign_members: None,
    };

    // Stages 3 + 4: nearest-feature matching and geodesic distance.
    // The representative-point lookup is built once, before the per-event
    // loop; each event's computation is independent of the others.
    let fault_points = representative_points(&faults);

    let mut enriched: Vec<EnrichedEvent> = Vec::with_capacity(events.len());
    for event in events {
        let mut row = EnrichedEvent::from_event(event);
        row.city = extract_city(&row.event.location);

        let matched = find_closest_fault(row.event.latitude, row.event.longitude, &faults);
        row.closest_fault_idx = matched.closest_idx;

        if let Some(idx) = matched.closest_idx {
            report.matched_events += 1;
            if let Some(fault) = faults.get(idx) {
                row.fault_properties = fault.properties.clone();
            }

            match fault_points.get(&idx) {
                Some(&(fault_lat, fault_lng)) => {
                    let meters =
                        haversine_m(row.event.latitude, row.event.longitude, fault_lat, fault_lng);
                    row.distance_to_fault_m = Some(meters);
                    row.distance_to_fault_km = Some(round_km(meters));
                }
                None => report.missing_distances += 1,
            }
        } else {
            report.unmatched_events += 1;
        }

        enriched.push(row);
    }

    // Stage 5: attribute normalization
    let enriched = normalize_attributes(enriched, &config.normalize_attributes.value);

    // Stage 6: temporal filter
    let enriched = apply_interval_policy(enriched, config.interval.value, today);
    report.events_out = enriched.len();

    tracing::info!(
        events_in = report.events_in,
        events_out = report.events_out,
        matched = report.matched_events,
        unmatched = report.unmatched_events,
        "pipeline complete"
    );

    Ok(PipelineOutput {
        events: enriched,
        faults,
        filtered_collection,
        document: catalog,
        bbox,
        high_mag_threshold: config.high_mag_threshold.value,
        report,
    })
}

/// Join key used by the visualizer to show the matched fault's source id.
pub fn matched_catalog_id(event: &EnrichedEvent) -> Option<&str> {
    match event.fault_properties.get("catalog_id") {
        Some(PropertyValue::Text(id)) => Some(id.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::GeoJson;

    fn event(timestamp: &str, lat: f64, lng: f64) -> Event {
        Event {
            timestamp: timestamp.to_string(),
            location: "5 km NE of Izmir (KARSIYAKA)".to_string(),
            magnitude: 4.2,
            latitude: lat,
            longitude: lng,
            depth_km: 9.3,
        }
    }

    fn catalog() -> FeatureCollection {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[27.1, 38.1], [27.3, 38.4]]
                    },
                    "properties": {"catalog_id": "GEM01", "average_dip": "(40, 30, 50)"}
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[120.0, -8.0], [121.0, -8.5]]
                    },
                    "properties": {"catalog_id": "FAR_AWAY"}
                }
            ]
        }"#;
        match doc.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(fc) => fc,
            _ => unreachable!(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 2, 7).unwrap()
    }

    #[test]
    fn test_pipeline_enriches_and_filters() {
        let events = vec![event("2023.02.06 01:17:32", 38.0, 27.0)];
        let config = LayeredConfig::with_defaults();

        let output = run_pipeline(events, catalog(), &config, today()).unwrap();

        // Out-of-box feature is filtered away
        assert_eq!(output.faults.len(), 1);
        assert_eq!(output.filtered_collection.features.len(), 1);
        assert_eq!(output.document.features.len(), 2);

        let row = &output.events[0];
        assert_eq!(row.city.as_deref(), Some("KARSIYAKA"));
        assert_eq!(row.closest_fault_idx, Some(0));
        assert!(row.distance_to_fault_m.is_some());

        // Normalized attribute joined onto the event
        assert_eq!(
            row.fault_properties.get("average_dip"),
            Some(&PropertyValue::Number(40.0))
        );
        assert_eq!(matched_catalog_id(row), Some("GEM01"));

        // Reported km matches the rounded meters
        let m = row.distance_to_fault_m.unwrap();
        assert_eq!(row.distance_to_fault_km.unwrap(), (m / 1000.0 * 100.0).round() / 100.0);
    }

    #[test]
    fn test_pipeline_with_no_faults_in_box_completes() {
        let events =
            vec![event("2023.02.06 01:17:32", -40.0, -70.0), event("2023.02.06 02:00:00", -41.0, -71.0)];
        let config = LayeredConfig::with_defaults();

        let output = run_pipeline(events, catalog(), &config, today()).unwrap();

        assert!(output.faults.is_empty());
        assert_eq!(output.report.unmatched_events, 2);
        for row in &output.events {
            assert_eq!(row.closest_fault_idx, None);
            assert_eq!(row.distance_to_fault_m, None);
            assert!(row.fault_properties.is_empty());
        }
    }

    #[test]
    fn test_pipeline_empty_events_is_an_error() {
        let config = LayeredConfig::with_defaults();
        let result = run_pipeline(vec![], catalog(), &config, today());
        assert!(result.is_err());
    }

    #[test]
    fn test_pipeline_report_counts() {
        let events = vec![
            event("2023.02.06 01:17:32", 38.0, 27.0),
            event("2023.02.06 02:00:00", 38.2, 27.2),
        ];
        let config = LayeredConfig::with_defaults();

        let output = run_pipeline(events, catalog(), &config, today()).unwrap();

        assert_eq!(output.report.events_in, 2);
        assert_eq!(output.report.catalog_features, 2);
        assert_eq!(output.report.filtered_features, 1);
        assert_eq!(output.report.matched_events, 2);
        assert_eq!(output.report.events_out, 2);
    }
}
