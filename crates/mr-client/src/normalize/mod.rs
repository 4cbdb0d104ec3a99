//! Response normalization into the three canonical shapes.
//!
//! Normalization is a pure function of the payload bytes and the declared
//! format. A payload that does not parse as its declared format is an
//! error, never an empty result.

mod geometry;
mod linked_data;
mod tabular;

use serde_json::Value;

use mr_common::{MrError, MrResult};
use mr_ogc::{ResponseFormat, Shape};

pub use geometry::{Geometry, TaggedGeometry};
pub use linked_data::{Term, Triple};

/// One tabular record: column name to value, in server order.
pub type Record = serde_json::Map<String, Value>;

/// A normalized response. Consumers must handle every shape.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResult {
    TabularSet(Vec<Record>),
    GeometryCollection(Vec<TaggedGeometry>),
    LinkedDataGraph(Vec<Triple>),
}

impl NormalizedResult {
    pub fn shape(&self) -> Shape {
        match self {
            NormalizedResult::TabularSet(_) => Shape::Tabular,
            NormalizedResult::GeometryCollection(_) => Shape::Geometry,
            NormalizedResult::LinkedDataGraph(_) => Shape::LinkedData,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NormalizedResult::TabularSet(records) => records.len(),
            NormalizedResult::GeometryCollection(geometries) => geometries.len(),
            NormalizedResult::LinkedDataGraph(triples) => triples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            NormalizedResult::TabularSet(records) => Some(records),
            _ => None,
        }
    }

    pub fn into_geometries(self) -> Option<Vec<TaggedGeometry>> {
        match self {
            NormalizedResult::GeometryCollection(geometries) => Some(geometries),
            _ => None,
        }
    }

    pub fn into_triples(self) -> Option<Vec<Triple>> {
        match self {
            NormalizedResult::LinkedDataGraph(triples) => Some(triples),
            _ => None,
        }
    }
}

/// Normalize a payload according to its declared format.
///
/// Fails with `UnsupportedFormat` when the format has no canonical shape
/// and with `MalformedPayload` when the bytes do not parse as that format.
pub fn normalize(payload: &[u8], declared_format: ResponseFormat) -> MrResult<NormalizedResult> {
    if declared_format.shape().is_none() {
        return Err(MrError::UnsupportedFormat(declared_format.to_string()));
    }

    match declared_format {
        ResponseFormat::Json => tabular::from_json(payload).map(NormalizedResult::TabularSet),
        ResponseFormat::GeoJson => tabular::from_geojson(payload).map(NormalizedResult::TabularSet),
        ResponseFormat::Gml => tabular::from_gml(payload).map(NormalizedResult::TabularSet),
        ResponseFormat::Csv => tabular::from_csv(payload).map(NormalizedResult::TabularSet),
        ResponseFormat::GeoJsonGeometry => {
            geometry::from_geojson(payload).map(NormalizedResult::GeometryCollection)
        }
        ResponseFormat::Wkt => geometry::from_wkt(payload).map(NormalizedResult::GeometryCollection),
        ResponseFormat::NTriples => {
            linked_data::from_ntriples(payload).map(NormalizedResult::LinkedDataGraph)
        }
        ResponseFormat::RdfXml => linked_data::from_rdf_xml(payload).map(NormalizedResult::LinkedDataGraph),
        ResponseFormat::Png | ResponseFormat::Kml | ResponseFormat::ShapeZip => {
            Err(MrError::UnsupportedFormat(declared_format.to_string()))
        }
    }
}

fn utf8<'a>(payload: &'a [u8], format: ResponseFormat) -> MrResult<&'a str> {
    std::str::from_utf8(payload)
        .map_err(|e| MrError::malformed(format.to_string(), format!("not valid UTF-8: {}", e)))
}

fn require_content(payload: &[u8], format: ResponseFormat) -> MrResult<()> {
    if payload.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(MrError::malformed(format.to_string(), "empty payload"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_formats() {
        for format in [ResponseFormat::Png, ResponseFormat::Kml, ResponseFormat::ShapeZip] {
            assert!(matches!(
                normalize(b"\x89PNG", format),
                Err(MrError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_shapes_match_format() {
        let result = normalize(b"[]", ResponseFormat::Json).unwrap();
        assert_eq!(result.shape(), Shape::Tabular);
        assert!(result.is_empty());

        let result = normalize(b"", ResponseFormat::NTriples).unwrap();
        assert_eq!(result.shape(), Shape::LinkedData);
    }
}
