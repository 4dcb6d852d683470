//! KOERI monthly bulletin parsing.
//!
//! Bulletins are small XML documents with one element per event. The
//! element name is `earhquake` - the typo is part of the upstream format.
//! Event fields are carried as attributes: `name` (timestamp), `lokasyon`
//! (location), `lat`, `lng`, `mag`, `Depth`.

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;

use faultline_core::models::Event;

use crate::error::{IngestError, Result};

const EVENT_ELEMENT: &[u8] = b"earhquake";

/// Result of parsing a batch of bulletin files, with a side-channel count
/// of files that could not be read.
#[derive(Debug, Default)]
pub struct ParsedBulletins {
    pub events: Vec<Event>,
    pub failed_files: usize,
}

/// Parse one bulletin file into the flat event table.
///
/// Events with a non-positive magnitude are placeholders in the source
/// format and are dropped. Malformed attributes on an otherwise readable
/// element default to zero/empty, matching the tolerant source reader.
pub fn parse_bulletin(path: &Path) -> Result<Vec<Event>> {
    let mut reader = Reader::from_file(path).map_err(|e| IngestError::BulletinParse {
        path: path.to_path_buf(),
        reason: format!("{}", e),
    })?;

    let mut events = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Empty(ref element)) | Ok(XmlEvent::Start(ref element))
                if element.name().as_ref() == EVENT_ELEMENT =>
            {
                if let Some(event) = convert_element(element) {
                    events.push(event);
                }
            }
            Ok(XmlEvent::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(IngestError::BulletinParse {
                    path: path.to_path_buf(),
                    reason: format!("{}", e),
                })
            }
        }
        buf.clear();
    }

    Ok(events)
}

fn convert_element(element: &BytesStart<'_>) -> Option<Event> {
    let mut timestamp = String::new();
    let mut location = String::new();
    let mut magnitude = 0.0f64;
    let mut latitude = 0.0f64;
    let mut longitude = 0.0f64;
    let mut depth_km = 0.0f64;

    for attr in element.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.as_ref() {
            b"name" => timestamp = value.into_owned(),
            b"lokasyon" => location = value.trim().to_string(),
            b"mag" => magnitude = value.parse().unwrap_or(0.0),
            b"lat" => latitude = value.parse().unwrap_or(0.0),
            b"lng" => longitude = value.parse().unwrap_or(0.0),
            b"Depth" => depth_km = value.parse().unwrap_or(0.0),
            _ => {}
        }
    }

    if magnitude <= 0.0 {
        return None;
    }

    Some(Event { timestamp, location, magnitude, latitude, longitude, depth_km })
}

/// Parse a batch of bulletin files, in input order.
///
/// A file that fails to parse contributes no events and is counted in
/// `failed_files`; it never aborts the batch.
pub fn parse_bulletins(paths: &[PathBuf]) -> ParsedBulletins {
    let mut batch = ParsedBulletins::default();

    for path in paths {
        match parse_bulletin(path) {
            Ok(mut events) => batch.events.append(&mut events),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "skipping unreadable bulletin");
                batch.failed_files += 1;
            }
        }
    }

    tracing::info!(
        files = paths.len(),
        failed = batch.failed_files,
        events = batch.events.len(),
        "parsed bulletins"
    );

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<eqlist>
    <earhquake name="2023.02.06 01:17:32" lokasyon="PAZARCIK (KAHRAMANMARAS) "
        lat="37.288" lng="37.043" mag="7.7" Depth="8.6" />
    <earhquake name="2023.02.06 01:28:16" lokasyon="NURDAGI (GAZIANTEP) "
        lat="37.178" lng="36.929" mag="6.6" Depth="10.0" />
    <earhquake name="2023.02.06 02:00:00" lokasyon="placeholder"
        lat="0.0" lng="0.0" mag="0" Depth="0" />
</eqlist>"#;

    fn write_bulletin(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_parse_bulletin_reads_attributes() {
        let file = write_bulletin(SAMPLE);
        let events = parse_bulletin(file.path()).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp, "2023.02.06 01:17:32");
        assert_eq!(events[0].location, "PAZARCIK (KAHRAMANMARAS)");
        assert_eq!(events[0].magnitude, 7.7);
        assert_eq!(events[0].latitude, 37.288);
        assert_eq!(events[0].longitude, 37.043);
        assert_eq!(events[0].depth_km, 8.6);
    }

    #[test]
    fn test_zero_magnitude_placeholders_dropped() {
        let file = write_bulletin(SAMPLE);
        let events = parse_bulletin(file.path()).unwrap();
        assert!(events.iter().all(|e| e.magnitude > 0.0));
    }

    #[test]
    fn test_parse_bulletins_batch_isolates_failures() {
        let good = write_bulletin(SAMPLE);
        let bad = write_bulletin("<eqlist><earhquake name=");

        let batch = parse_bulletins(&[
            good.path().to_path_buf(),
            bad.path().to_path_buf(),
        ]);

        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.failed_files, 1);
    }

    #[test]
    fn test_missing_file_counts_as_failed() {
        let batch = parse_bulletins(&[PathBuf::from("/nonexistent/202302.xml")]);
        assert!(batch.events.is_empty());
        assert_eq!(batch.failed_files, 1);
    }
}
