//! Tabular normalization: JSON records, GeoJSON features, GML features, CSV rows.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;

use mr_common::{MrError, MrResult};
use mr_ogc::ResponseFormat;

use super::{require_content, Record};

/// A JSON array of objects, or a single object as one record. A GeoJSON
/// document is read feature by feature.
pub(super) fn from_json(payload: &[u8]) -> MrResult<Vec<Record>> {
    let format = ResponseFormat::Json;
    require_content(payload, format)?;

    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| MrError::malformed(format.to_string(), e.to_string()))?;

    // Geoserver answers a JSON GetFeature with GeoJSON.
    if is_geojson(&value) {
        return geojson_records(&value);
    }

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(MrError::malformed(
                    format.to_string(),
                    format!("element {} is {}, expected an object", idx, kind(&other)),
                )),
            })
            .collect(),
        Value::Object(record) => Ok(vec![record]),
        other => Err(MrError::malformed(
            format.to_string(),
            format!("expected an array or object, got {}", kind(&other)),
        )),
    }
}

/// A GeoJSON FeatureCollection (or single Feature): one record per feature.
///
/// Record keys are the feature's properties in server order, followed by
/// the geometry under the feature's `geometry_name` (default `geometry`).
pub(super) fn from_geojson(payload: &[u8]) -> MrResult<Vec<Record>> {
    let format = ResponseFormat::GeoJson;
    require_content(payload, format)?;

    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| MrError::malformed(format.to_string(), e.to_string()))?;
    geojson_records(&value)
}

fn is_geojson(value: &Value) -> bool {
    matches!(
        value.get("type").and_then(Value::as_str),
        Some("FeatureCollection") | Some("Feature")
    )
}

fn geojson_records(value: &Value) -> MrResult<Vec<Record>> {
    let format = ResponseFormat::GeoJson;
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    MrError::malformed(format.to_string(), "FeatureCollection without a features array")
                })?;
            features.iter().map(feature_to_record).collect()
        }
        Some("Feature") => Ok(vec![feature_to_record(value)?]),
        other => Err(MrError::malformed(
            format.to_string(),
            format!("expected a FeatureCollection, got type {:?}", other),
        )),
    }
}

fn feature_to_record(feature: &Value) -> MrResult<Record> {
    let format = ResponseFormat::GeoJson;
    if feature.get("type").and_then(Value::as_str) != Some("Feature") {
        return Err(MrError::malformed(format.to_string(), "collection member is not a Feature"));
    }

    let mut record = match feature.get("properties") {
        Some(Value::Object(properties)) => properties.clone(),
        Some(Value::Null) | None => Record::new(),
        Some(other) => {
            return Err(MrError::malformed(
                format.to_string(),
                format!("feature properties are {}, expected an object", kind(other)),
            ))
        }
    };

    if let Some(geometry) = feature.get("geometry").filter(|g| !g.is_null()) {
        let key = feature
            .get("geometry_name")
            .and_then(Value::as_str)
            .unwrap_or("geometry");
        if !record.contains_key(key) {
            record.insert(key.to_string(), geometry.clone());
        }
    }

    Ok(record)
}

/// A CSV document with a header row. Values stay strings; a repeated
/// header collects its cells into an array.
pub(super) fn from_csv(payload: &[u8]) -> MrResult<Vec<Record>> {
    let format = ResponseFormat::Csv;
    require_content(payload, format)?;

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(payload);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MrError::malformed(format.to_string(), e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| MrError::malformed(format.to_string(), e.to_string()))?;
        let mut record = Record::new();
        for (name, value) in headers.iter().zip(row.iter()) {
            insert_value(&mut record, name.clone(), Value::String(value.to_string()));
        }
        records.push(record);
    }
    Ok(records)
}

/// A GML/WFS FeatureCollection: one record per feature member.
///
/// Simple properties become strings, empty ones null. Geometry properties
/// become the whitespace-joined text of their coordinate elements. A
/// repeated property becomes an array of its values in document order.
pub(super) fn from_gml(payload: &[u8]) -> MrResult<Vec<Record>> {
    let format = ResponseFormat::Gml;
    require_content(payload, format)?;
    let malformed = |message: String| MrError::malformed(format.to_string(), message);

    let mut reader = Reader::from_reader(payload);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut saw_root = false;
    let mut records = Vec::new();

    // Depth (stack length) at which the current feature element sits.
    let mut feature_depth: Option<usize> = None;
    let mut current = Record::new();
    let mut property: Option<(String, String)> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(format!("at position {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if !saw_root {
                    if name.as_slice() != b"FeatureCollection" {
                        return Err(malformed(format!(
                            "root element is {}, expected FeatureCollection",
                            String::from_utf8_lossy(&name)
                        )));
                    }
                    saw_root = true;
                } else if feature_depth.is_none() && is_member_container(stack.last()) {
                    feature_depth = Some(stack.len() + 1);
                    current = Record::new();
                } else if feature_depth.map(|d| stack.len() == d).unwrap_or(false) {
                    property = Some((String::from_utf8_lossy(&name).into_owned(), String::new()));
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                if !saw_root {
                    // An empty root is a valid, empty collection.
                    if e.local_name().as_ref() == b"FeatureCollection" {
                        return Ok(records);
                    }
                    return Err(malformed("root element is not a FeatureCollection".to_string()));
                }
                if let Some(depth) = feature_depth {
                    if stack.len() == depth {
                        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                        insert_value(&mut current, name, Value::Null);
                    }
                } else if is_member_container(stack.last()) {
                    records.push(Record::new());
                }
            }
            Event::Text(t) => {
                if let Some((_, text)) = property.as_mut() {
                    let unescaped = t.unescape().map_err(|e| malformed(e.to_string()))?;
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&unescaped);
                }
            }
            Event::CData(t) => {
                if let Some((_, text)) = property.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(_) => {
                let depth = stack.len();
                stack.pop();
                match feature_depth {
                    Some(d) if depth == d + 1 => {
                        if let Some((name, text)) = property.take() {
                            let value = if text.is_empty() {
                                Value::Null
                            } else {
                                Value::String(text)
                            };
                            insert_value(&mut current, name, value);
                        }
                    }
                    Some(d) if depth == d => {
                        records.push(std::mem::take(&mut current));
                        feature_depth = None;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(malformed("no FeatureCollection element".to_string()));
    }
    if !stack.is_empty() {
        return Err(malformed("document ended inside an element".to_string()));
    }
    Ok(records)
}

/// Repeated columns are multi-valued: their values are collected into an
/// array in received order. Single values are never arrays here.
fn insert_value(record: &mut Record, name: String, value: Value) {
    match record.get_mut(&name) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            record.insert(name, value);
        }
    }
}

fn is_member_container(name: Option<&Vec<u8>>) -> bool {
    matches!(
        name.map(Vec::as_slice),
        Some(b"member") | Some(b"featureMember") | Some(b"featureMembers")
    )
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_records_keep_order() {
        let json = br#"[{"MRGID": 3293, "preferredGazetteerName": "Belgian Exclusive Economic Zone", "accepted": 3293}]"#;
        let records = from_json(json).unwrap();
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["MRGID", "preferredGazetteerName", "accepted"]);
    }

    #[test]
    fn test_json_rejects_scalars() {
        assert!(from_json(b"42").is_err());
        assert!(from_json(b"[1, 2]").is_err());
        assert!(from_json(b"").is_err());
        assert!(from_json(b"[{\"a\": 1}").is_err());
    }

    #[test]
    fn test_geojson_feature_properties() {
        let json = br#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":"eez.1","geometry":null,"properties":{"mrgid":8371,"geoname":"Belgian Exclusive Economic Zone"}},
            {"type":"Feature","geometry_name":"the_geom","geometry":{"type":"Point","coordinates":[2.5,51.5]},"properties":{"mrgid":5668}}
        ]}"#;
        let records = from_geojson(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["geoname"], "Belgian Exclusive Economic Zone");
        assert!(!records[0].contains_key("geometry"));
        assert_eq!(records[1]["the_geom"]["type"], "Point");
    }

    #[test]
    fn test_csv_rows() {
        let csv = b"FID,mrgid,geoname\neez.1,8371,Belgian Exclusive Economic Zone\neez.2,5668,\"Dutch EEZ, North Sea\"\n";
        let records = from_csv(csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["geoname"], "Dutch EEZ, North Sea");
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["FID", "mrgid", "geoname"]);
    }

    #[test]
    fn test_csv_ragged_rows_are_malformed() {
        assert!(from_csv(b"a,b\n1,2,3\n").is_err());
    }

    #[test]
    fn test_gml_truncated() {
        let gml = br#"<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs/2.0"><wfs:member><MarineRegions:eez>"#;
        assert!(matches!(from_gml(gml), Err(MrError::MalformedPayload { .. })));
    }

    #[test]
    fn test_json_reads_geojson_feature_by_feature() {
        let json = br#"{"type":"FeatureCollection","totalFeatures":2,"features":[
            {"type":"Feature","geometry":null,"properties":{"mrgid":3293}},
            {"type":"Feature","geometry":null,"properties":{"mrgid":5668}}
        ]}"#;
        let records = from_json(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["mrgid"], 5668);
        assert!(!records[0].contains_key("features"));

        // Gazetteer records carry no GeoJSON type and stay whole.
        let records = from_json(br#"{"MRGID":3293,"placeType":"EEZ"}"#).unwrap();
        assert_eq!(records[0]["placeType"], "EEZ");
    }

    #[test]
    fn test_gml_repeated_property_is_multi_valued() {
        let gml = br#"<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs/2.0" xmlns:m="http://marineregions.org">
  <wfs:member>
    <m:f><m:name>A</m:name><m:iso/><m:name>B</m:name><m:name>C</m:name><m:iso/></m:f>
  </wfs:member>
</wfs:FeatureCollection>"#;
        let records = from_gml(gml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], serde_json::json!(["A", "B", "C"]));
        assert_eq!(records[0]["iso"], serde_json::json!([null, null]));
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["name", "iso"]);
    }

    #[test]
    fn test_csv_repeated_header_is_multi_valued() {
        let csv = b"mrgid,name,name\n3293,Belgian EEZ,Belgische EEZ\n";
        let records = from_csv(csv).unwrap();
        assert_eq!(records[0]["mrgid"], "3293");
        assert_eq!(records[0]["name"], serde_json::json!(["Belgian EEZ", "Belgische EEZ"]));
    }
}
