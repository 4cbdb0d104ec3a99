//! Coordinate Reference System identifiers and geometry CRS tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A coordinate reference system as declared by a remote payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// OGC CRS84: WGS84 with longitude/latitude axis order.
    Crs84,
    /// An EPSG code, e.g. 4326 or 3857.
    Epsg(u32),
    /// Any other identifier, kept verbatim.
    Other(String),
}

impl Crs {
    /// Parse the CRS identifiers found in OGC payloads.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "urn:ogc:def:crs:EPSG::4326"
    /// - "http://www.opengis.net/def/crs/EPSG/0/4326"
    /// - "CRS:84", "urn:ogc:def:crs:OGC:1.3:CRS84"
    /// - "http://www.opengis.net/def/crs/OGC/1.3/CRS84"
    ///
    /// Unrecognized identifiers become `Crs::Other`, so parsing never fails.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim().trim_start_matches('<').trim_end_matches('>');
        let upper = trimmed.to_uppercase();

        if upper == "CRS:84" || upper.ends_with("CRS84") {
            return Crs::Crs84;
        }

        let epsg_code = if let Some(rest) = upper.strip_prefix("EPSG:") {
            Some(rest)
        } else if upper.starts_with("URN:OGC:DEF:CRS:EPSG:") {
            upper.rsplit(':').next()
        } else if upper.contains("/DEF/CRS/EPSG/") {
            upper.rsplit('/').next()
        } else if upper.contains("SPATIALREFERENCE.ORG/REF/EPSG/") || upper.contains("#") {
            upper
                .rsplit(|c| c == '/' || c == '#')
                .find(|part| !part.is_empty())
        } else {
            None
        };

        match epsg_code.and_then(|code| code.parse::<u32>().ok()) {
            Some(code) => Crs::Epsg(code),
            None => Crs::Other(trimmed.to_string()),
        }
    }

    /// Check if this CRS is WGS84 geographic, in either axis order.
    pub fn is_wgs84(&self) -> bool {
        matches!(self, Crs::Crs84 | Crs::Epsg(4326))
    }

    /// Get the axis order of coordinates expressed in this CRS.
    ///
    /// EPSG:4326 is latitude first by definition; CRS84 and projected
    /// systems are x (longitude/easting) first.
    pub fn axis_order(&self) -> AxisOrder {
        match self {
            Crs::Epsg(4326) | Crs::Epsg(4258) | Crs::Epsg(4269) => AxisOrder::LatLon,
            _ => AxisOrder::XY,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Crs84 => write!(f, "OGC:CRS84"),
            Crs::Epsg(code) => write!(f, "EPSG:{}", code),
            Crs::Other(id) => write!(f, "{}", id),
        }
    }
}

/// Axis order for coordinate interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// X (longitude/easting), Y (latitude/northing)
    XY,
    /// Y (latitude/northing), X (longitude/easting)
    LatLon,
}

/// Where a geometry's CRS came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrsOrigin {
    /// The payload declared it.
    Declared,
    /// The payload was silent and the service default was applied.
    ServiceDefault,
}

/// The CRS attached to every normalized geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrsTag {
    pub crs: Crs,
    pub origin: CrsOrigin,
}

impl CrsTag {
    pub fn declared(crs: Crs) -> Self {
        Self {
            crs,
            origin: CrsOrigin::Declared,
        }
    }

    /// WGS84 longitude/latitude, applied when a payload carries no CRS header.
    pub fn service_default() -> Self {
        Self {
            crs: Crs::Crs84,
            origin: CrsOrigin::ServiceDefault,
        }
    }

    pub fn is_default(&self) -> bool {
        self.origin == CrsOrigin::ServiceDefault
    }
}

impl fmt::Display for CrsTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            CrsOrigin::Declared => write!(f, "{}", self.crs),
            CrsOrigin::ServiceDefault => write!(f, "{} (default)", self.crs),
        }
    }
}
