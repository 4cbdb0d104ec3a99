//! Response formats and the canonical shape each one normalizes to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical in-memory shapes a payload can be normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Tabular,
    Geometry,
    LinkedData,
}

/// Payload encodings the dispatcher can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Plain JSON: an array of records or a single record object
    #[default]
    Json,
    /// GeoJSON FeatureCollection, one record per feature
    GeoJson,
    /// GML feature collection, one record per feature
    Gml,
    /// Comma-separated values with a header row
    Csv,
    /// GeoJSON read for its geometries only
    GeoJsonGeometry,
    /// Well-known text, one geometry per line
    Wkt,
    /// RDF N-Triples
    NTriples,
    /// RDF/XML
    RdfXml,
    /// Rendered map image
    Png,
    Kml,
    ShapeZip,
}

impl ResponseFormat {
    /// The canonical shape for this format, or `None` if it has no tabular,
    /// geometry or linked-data reading.
    pub fn shape(&self) -> Option<Shape> {
        match self {
            ResponseFormat::Json
            | ResponseFormat::GeoJson
            | ResponseFormat::Gml
            | ResponseFormat::Csv => Some(Shape::Tabular),
            ResponseFormat::GeoJsonGeometry | ResponseFormat::Wkt => Some(Shape::Geometry),
            ResponseFormat::NTriples | ResponseFormat::RdfXml => Some(Shape::LinkedData),
            ResponseFormat::Png | ResponseFormat::Kml | ResponseFormat::ShapeZip => None,
        }
    }

    /// Value for the WFS `outputFormat` parameter.
    pub fn wfs_output_format(&self) -> Option<&'static str> {
        match self {
            ResponseFormat::Json | ResponseFormat::GeoJson | ResponseFormat::GeoJsonGeometry => {
                Some("application/json")
            }
            ResponseFormat::Gml => Some("application/gml+xml; version=3.2"),
            ResponseFormat::Csv => Some("csv"),
            ResponseFormat::Kml => Some("application/vnd.google-earth.kml+xml"),
            ResponseFormat::ShapeZip => Some("SHAPE-ZIP"),
            ResponseFormat::Wkt
            | ResponseFormat::NTriples
            | ResponseFormat::RdfXml
            | ResponseFormat::Png => None,
        }
    }

    /// File-style suffix used by the gazetteer REST service (`getX.json/...`).
    pub fn rest_suffix(&self) -> Option<&'static str> {
        match self {
            ResponseFormat::Json => Some("json"),
            ResponseFormat::Gml => Some("xml"),
            ResponseFormat::RdfXml => Some("rdf"),
            ResponseFormat::NTriples => Some("nt"),
            _ => None,
        }
    }

    /// MIME type for Accept headers and diagnostics.
    pub fn to_mime(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::GeoJson | ResponseFormat::GeoJsonGeometry => "application/geo+json",
            ResponseFormat::Gml => "application/gml+xml",
            ResponseFormat::Csv => "text/csv",
            ResponseFormat::Wkt => "text/plain",
            ResponseFormat::NTriples => "application/n-triples",
            ResponseFormat::RdfXml => "application/rdf+xml",
            ResponseFormat::Png => "image/png",
            ResponseFormat::Kml => "application/vnd.google-earth.kml+xml",
            ResponseFormat::ShapeZip => "application/zip",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseFormat::Json => "JSON",
            ResponseFormat::GeoJson => "GeoJSON",
            ResponseFormat::Gml => "GML",
            ResponseFormat::Csv => "CSV",
            ResponseFormat::GeoJsonGeometry => "GeoJSON geometry",
            ResponseFormat::Wkt => "WKT",
            ResponseFormat::NTriples => "N-Triples",
            ResponseFormat::RdfXml => "RDF/XML",
            ResponseFormat::Png => "PNG",
            ResponseFormat::Kml => "KML",
            ResponseFormat::ShapeZip => "SHAPE-ZIP",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        assert_eq!(ResponseFormat::GeoJson.shape(), Some(Shape::Tabular));
        assert_eq!(ResponseFormat::Wkt.shape(), Some(Shape::Geometry));
        assert_eq!(ResponseFormat::RdfXml.shape(), Some(Shape::LinkedData));
        assert_eq!(ResponseFormat::Png.shape(), None);
    }

    #[test]
    fn test_output_formats() {
        assert_eq!(ResponseFormat::GeoJson.wfs_output_format(), Some("application/json"));
        assert_eq!(ResponseFormat::Csv.wfs_output_format(), Some("csv"));
        assert_eq!(ResponseFormat::NTriples.wfs_output_format(), None);
    }
}
