//! Geometry-only normalization. Every geometry carries an explicit CRS tag.

use serde::Serialize;
use serde_json::Value;

use mr_common::{Crs, CrsTag, MrError, MrResult};
use mr_ogc::ResponseFormat;

use super::{require_content, utf8};

const GEOMETRY_TYPES: [&str; 7] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// Geometry encodings kept as delivered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "encoding", content = "value", rename_all = "lowercase")]
pub enum Geometry {
    GeoJson(Value),
    Wkt(String),
}

impl Geometry {
    /// The geometry type name, e.g. "MultiPolygon".
    pub fn geometry_type(&self) -> Option<&str> {
        match self {
            Geometry::GeoJson(value) => value.get("type").and_then(Value::as_str),
            Geometry::Wkt(text) => text
                .split(|c: char| c == '(' || c.is_whitespace())
                .next()
                .filter(|s| !s.is_empty()),
        }
    }
}

/// A geometry and the CRS it is expressed in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedGeometry {
    pub crs: CrsTag,
    pub geometry: Geometry,
}

/// GeoJSON read for geometries only.
///
/// Accepts a FeatureCollection (null geometries are skipped), a Feature, a
/// GeometryCollection (one entry per member) or a bare geometry. The CRS
/// comes from the top-level `crs` member; without one the WGS84 default
/// is applied and marked as such.
pub(super) fn from_geojson(payload: &[u8]) -> MrResult<Vec<TaggedGeometry>> {
    let format = ResponseFormat::GeoJsonGeometry;
    require_content(payload, format)?;

    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| MrError::malformed(format.to_string(), e.to_string()))?;

    let crs = value
        .pointer("/crs/properties/name")
        .and_then(Value::as_str)
        .map(|name| CrsTag::declared(Crs::parse(name)))
        .unwrap_or_else(CrsTag::service_default);

    let geometries: Vec<&Value> = match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => value
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                MrError::malformed(format.to_string(), "FeatureCollection without a features array")
            })?
            .iter()
            .filter_map(|feature| feature.get("geometry"))
            .filter(|geometry| !geometry.is_null())
            .collect(),
        Some("Feature") => value.get("geometry").filter(|g| !g.is_null()).into_iter().collect(),
        Some("GeometryCollection") => value
            .get("geometries")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                MrError::malformed(format.to_string(), "GeometryCollection without geometries")
            })?
            .iter()
            .collect(),
        Some(_) => vec![&value],
        None => {
            return Err(MrError::malformed(
                format.to_string(),
                "top-level object has no type",
            ))
        }
    };

    geometries
        .into_iter()
        .map(|geometry| {
            check_geojson_geometry(geometry)?;
            Ok(TaggedGeometry {
                crs: crs.clone(),
                geometry: Geometry::GeoJson(geometry.clone()),
            })
        })
        .collect()
}

fn check_geojson_geometry(geometry: &Value) -> MrResult<()> {
    let format = ResponseFormat::GeoJsonGeometry;
    let kind = geometry.get("type").and_then(Value::as_str).unwrap_or("");
    if !GEOMETRY_TYPES.contains(&kind) {
        return Err(MrError::malformed(
            format.to_string(),
            format!("'{}' is not a geometry type", kind),
        ));
    }
    let member = if kind == "GeometryCollection" { "geometries" } else { "coordinates" };
    if !geometry.get(member).map(Value::is_array).unwrap_or(false) {
        return Err(MrError::malformed(
            format.to_string(),
            format!("{} without a {} array", kind, member),
        ));
    }
    Ok(())
}

/// One WKT geometry per non-empty line.
///
/// A line may start with a GeoSPARQL CRS IRI (`<http://...> POLYGON(...)`)
/// or an EWKT SRID (`SRID=4326;POINT(...)`); lines without either get the
/// WGS84 default.
pub(super) fn from_wkt(payload: &[u8]) -> MrResult<Vec<TaggedGeometry>> {
    let format = ResponseFormat::Wkt;
    require_content(payload, format)?;
    let text = utf8(payload, format)?;

    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            parse_wkt_line(line).map_err(|message| {
                MrError::malformed(format.to_string(), format!("line {}: {}", line_no, message))
            })
        })
        .collect()
}

fn parse_wkt_line(line: &str) -> Result<TaggedGeometry, String> {
    let (crs, body) = if let Some(rest) = line.strip_prefix('<') {
        let end = rest.find('>').ok_or("unterminated CRS IRI")?;
        (CrsTag::declared(Crs::parse(&rest[..end])), rest[end + 1..].trim())
    } else if line.get(..5).map_or(false, |p| p.eq_ignore_ascii_case("SRID=")) {
        let end = line.find(';').ok_or("SRID prefix without ';'")?;
        let code: u32 = line[5..end]
            .trim()
            .parse()
            .map_err(|_| format!("invalid SRID '{}'", &line[5..end]))?;
        (CrsTag::declared(Crs::Epsg(code)), line[end + 1..].trim())
    } else {
        (CrsTag::service_default(), line)
    };

    check_wkt(body)?;
    Ok(TaggedGeometry {
        crs,
        geometry: Geometry::Wkt(body.to_string()),
    })
}

fn check_wkt(body: &str) -> Result<(), String> {
    let keyword_end = body
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(body.len());
    let keyword = body[..keyword_end].to_ascii_uppercase();
    if !GEOMETRY_TYPES.iter().any(|t| t.to_ascii_uppercase() == keyword) {
        return Err(format!("'{}' is not a WKT geometry type", &body[..keyword_end]));
    }

    let rest = body[keyword_end..].trim_start();
    let rest = ["ZM", "Z", "M"]
        .iter()
        .find_map(|dim| {
            rest.strip_prefix(dim)
                .filter(|r| r.starts_with(|c: char| c == '(' || c.is_whitespace()))
        })
        .map(str::trim_start)
        .unwrap_or(rest);

    if rest.eq_ignore_ascii_case("EMPTY") {
        return Ok(());
    }
    if !rest.starts_with('(') || !rest.ends_with(')') {
        return Err("coordinates must be enclosed in parentheses".to_string());
    }

    let mut depth: i32 = 0;
    for (idx, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 || (depth == 0 && idx != rest.len() - 1) {
                    return Err("unbalanced parentheses".to_string());
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced parentheses".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_declared_crs() {
        let json = br#"{"type":"FeatureCollection","crs":{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::4326"}},
            "features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[51.5,2.5]},"properties":{}}]}"#;
        let geometries = from_geojson(json).unwrap();
        assert_eq!(geometries.len(), 1);
        assert_eq!(geometries[0].crs, CrsTag::declared(Crs::Epsg(4326)));
        assert_eq!(geometries[0].geometry.geometry_type(), Some("Point"));
    }

    #[test]
    fn test_geojson_rejects_non_geometry() {
        assert!(from_geojson(br#"{"type":"Circle","radius":3}"#).is_err());
        assert!(from_geojson(br#"{"type":"Polygon"}"#).is_err());
        assert!(from_geojson(br#"{"coordinates":[1,2]}"#).is_err());
    }

    #[test]
    fn test_wkt_headers() {
        let wkt = b"<http://www.opengis.net/def/crs/OGC/1.3/CRS84> POINT (2.5 51.5)\n\
                    SRID=3857;POINT(278298 6710097)\n\
                    MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)))\n";
        let geometries = from_wkt(wkt).unwrap();
        assert_eq!(geometries.len(), 3);
        assert_eq!(geometries[0].crs, CrsTag::declared(Crs::Crs84));
        assert_eq!(geometries[1].crs, CrsTag::declared(Crs::Epsg(3857)));
        assert!(geometries[2].crs.is_default());
        assert_eq!(geometries[2].geometry.geometry_type(), Some("MULTIPOLYGON"));
    }

    #[test]
    fn test_wkt_validation() {
        assert!(check_wkt("POINT Z (1 2 3)").is_ok());
        assert!(check_wkt("POLYGON EMPTY").is_ok());
        assert!(check_wkt("POLYGON ((0 0, 1 0, 1 1, 0 0)").is_err());
        assert!(check_wkt("POLYGON ((0 0)) (1 1)").is_err());
        assert!(check_wkt("CIRCLE (0 0, 5)").is_err());
        assert!(from_wkt(b"SRID=abc;POINT(1 2)").is_err());
    }
}
