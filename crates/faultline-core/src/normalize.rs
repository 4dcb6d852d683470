//! Attribute normalization and city extraction.
//!
//! Fault catalogs encode some attributes as bracketed numeric lists, e.g.
//! an `average_dip` of `"(40, 30, 50)"`, listing plausible values by
//! decreasing confidence. Normalization collapses such a value to its
//! first element, the most likely one.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{EnrichedEvent, PropertyValue};

fn number_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-+]?\d*\.\d+|\d+").expect("valid number token regex"))
}

/// Extract every numeric token from a literal text, in order.
pub fn parse_numeric_sequence(text: &str) -> Option<Vec<f64>> {
    let numbers: Vec<f64> = number_token_re()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();
    if numbers.is_empty() {
        None
    } else {
        Some(numbers)
    }
}

/// Collapse a multi-valued attribute into its representative scalar.
///
/// Text is tokenized into a numeric sequence first; an already-structured
/// sequence passes through that step unchanged. The first element of the
/// sequence is the retained value; no numeric content normalizes to
/// [`PropertyValue::Null`], never to zero. Plain numbers are left as-is.
pub fn normalize_value(value: &PropertyValue) -> PropertyValue {
    match value {
        PropertyValue::Text(text) => match parse_numeric_sequence(text) {
            Some(seq) => PropertyValue::Number(seq[0]),
            None => PropertyValue::Null,
        },
        PropertyValue::Sequence(seq) => match seq.first() {
            Some(first) => PropertyValue::Number(*first),
            None => PropertyValue::Null,
        },
        other => other.clone(),
    }
}

/// Normalize the configured attributes on every event's joined fault
/// properties, replacing each column in place. Runs once per attribute
/// per pipeline run; the replacement is not reversible.
pub fn normalize_attributes(
    mut events: Vec<EnrichedEvent>,
    attributes: &[String],
) -> Vec<EnrichedEvent> {
    for event in &mut events {
        for name in attributes {
            if let Some(value) = event.fault_properties.get(name) {
                let normalized = normalize_value(value);
                event.fault_properties.insert(name.clone(), normalized);
            }
        }
    }
    events
}

/// Pull a city name out of a free-text location: the content of the last
/// parenthesized group, trimmed. `"5 km NE of Izmir (KARSIYAKA)"` yields
/// `KARSIYAKA`; a location without parentheses yields `None`.
pub fn extract_city(location: &str) -> Option<String> {
    let start = location.rfind('(')?;
    let end = location.rfind(')')?;
    if start >= end {
        return None;
    }
    let city = location[start + 1..end].trim();
    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Event;
    use std::collections::HashMap;

    #[test]
    fn test_parse_numeric_sequence() {
        assert_eq!(parse_numeric_sequence("(2.5, 3.1, 4.0)"), Some(vec![2.5, 3.1, 4.0]));
        assert_eq!(parse_numeric_sequence("(40,,20)"), Some(vec![40.0, 20.0]));
        assert_eq!(parse_numeric_sequence("-0.5 to 1"), Some(vec![-0.5, 1.0]));
        assert_eq!(parse_numeric_sequence(""), None);
        assert_eq!(parse_numeric_sequence("unknown"), None);
    }

    #[test]
    fn test_normalize_value_takes_first_element() {
        let normalized = normalize_value(&PropertyValue::Text("(2.5, 3.1, 4.0)".to_string()));
        assert_eq!(normalized, PropertyValue::Number(2.5));
    }

    #[test]
    fn test_normalize_value_no_numeric_content() {
        assert_eq!(normalize_value(&PropertyValue::Text("".to_string())), PropertyValue::Null);
        assert_eq!(normalize_value(&PropertyValue::Text("n/a".to_string())), PropertyValue::Null);
    }

    #[test]
    fn test_normalize_value_structured_sequence_passes_through() {
        assert_eq!(
            normalize_value(&PropertyValue::Sequence(vec![1.5, 9.0])),
            PropertyValue::Number(1.5)
        );
        assert_eq!(normalize_value(&PropertyValue::Sequence(vec![])), PropertyValue::Null);
    }

    #[test]
    fn test_normalize_value_scalar_untouched() {
        assert_eq!(normalize_value(&PropertyValue::Number(7.0)), PropertyValue::Number(7.0));
        assert_eq!(normalize_value(&PropertyValue::Null), PropertyValue::Null);
    }

    #[test]
    fn test_normalize_attributes_replaces_in_place() {
        let mut properties = HashMap::new();
        properties.insert(
            "average_dip".to_string(),
            PropertyValue::Text("(40, 30, 50)".to_string()),
        );
        properties.insert("catalog_id".to_string(), PropertyValue::Text("GEM01".to_string()));

        let event = EnrichedEvent {
            fault_properties: properties,
            ..EnrichedEvent::from_event(Event {
                timestamp: "2023.02.06 01:17:32".to_string(),
                location: "x".to_string(),
                magnitude: 4.0,
                latitude: 38.0,
                longitude: 27.0,
                depth_km: 7.0,
            })
        };

        let out = normalize_attributes(vec![event], &["average_dip".to_string()]);
        assert_eq!(
            out[0].fault_properties.get("average_dip"),
            Some(&PropertyValue::Number(40.0))
        );
        // Unconfigured attributes are untouched
        assert_eq!(
            out[0].fault_properties.get("catalog_id"),
            Some(&PropertyValue::Text("GEM01".to_string()))
        );
    }

    #[test]
    fn test_extract_city() {
        assert_eq!(
            extract_city("5 km NE of Izmir (KARSIYAKA)"),
            Some("KARSIYAKA".to_string())
        );
        assert_eq!(extract_city("SULUSARAY-TOKAT"), None);
        assert_eq!(extract_city("odd ) ( order"), None);
        assert_eq!(extract_city("empty ()"), None);
        // Last group wins when there are several
        assert_eq!(extract_city("(A) somewhere (B)"), Some("B".to_string()));
    }
}
