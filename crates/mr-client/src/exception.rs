//! Detection of OGC exception reports delivered with a success status.
//!
//! Geoserver answers some failures (notably WMS ones) with HTTP 200 and a
//! `ServiceExceptionReport` or `ows:ExceptionReport` body.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Return the exception text if `body` is an OGC exception report.
///
/// Only the root element decides; other XML documents return `None`
/// without being read past their first element.
pub fn exception_text(body: &[u8]) -> Option<String> {
    let first = body.iter().find(|b| !b.is_ascii_whitespace())?;
    if *first != b'<' {
        return None;
    }

    let mut reader = Reader::from_reader(body);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut is_report = false;
    let mut in_text = false;
    let mut messages: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"ServiceExceptionReport" | b"ExceptionReport" if !is_report => {
                        is_report = true;
                    }
                    _ if !is_report => return None,
                    b"ServiceException" | b"ExceptionText" => in_text = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if !is_report {
                    let name = e.local_name();
                    return matches!(name.as_ref(), b"ServiceExceptionReport" | b"ExceptionReport")
                        .then(|| "no exception text".to_string());
                }
            }
            Ok(Event::Text(t)) if in_text => {
                if let Ok(text) = t.unescape() {
                    messages.push(text.trim().to_string());
                }
            }
            Ok(Event::CData(t)) if in_text => {
                messages.push(String::from_utf8_lossy(&t).trim().to_string());
            }
            Ok(Event::End(e)) => {
                if matches!(e.local_name().as_ref(), b"ServiceException" | b"ExceptionText") {
                    in_text = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) if !is_report => return None,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    if !is_report {
        return None;
    }
    messages.retain(|m| !m.is_empty());
    if messages.is_empty() {
        Some("no exception text".to_string())
    } else {
        Some(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wms_service_exception() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ServiceExceptionReport version="1.1.1">
  <ServiceException code="LayerNotDefined">Could not find layer MarineRegions:nope</ServiceException>
</ServiceExceptionReport>"#;
        assert_eq!(
            exception_text(xml.as_bytes()).as_deref(),
            Some("Could not find layer MarineRegions:nope")
        );
    }

    #[test]
    fn test_ows_exception_report() {
        let xml = r#"<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1" version="2.0.0">
  <ows:Exception exceptionCode="InvalidParameterValue" locator="cql_filter">
    <ows:ExceptionText>Could not parse CQL filter list.</ows:ExceptionText>
  </ows:Exception>
</ows:ExceptionReport>"#;
        assert_eq!(
            exception_text(xml.as_bytes()).as_deref(),
            Some("Could not parse CQL filter list.")
        );
    }

    #[test]
    fn test_other_documents() {
        assert_eq!(exception_text(b"{\"type\":\"FeatureCollection\"}"), None);
        assert_eq!(exception_text(b"<wfs:FeatureCollection></wfs:FeatureCollection>"), None);
        assert_eq!(exception_text(b""), None);
    }
}
