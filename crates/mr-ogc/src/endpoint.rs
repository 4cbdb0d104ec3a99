//! Endpoint resolution: data product + protocol -> base URL.

use serde::{Deserialize, Serialize};
use std::fmt;

use mr_common::{DataProductDescriptor, ServiceConfig};

/// Remote protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Wms,
    Wfs,
    Rest,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Wms => "WMS",
            Protocol::Wfs => "WFS",
            Protocol::Rest => "REST",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved base URL. OGC base URLs end in `?`, REST roots in `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub protocol: Protocol,
    pub base_url: String,
}

/// Resource probed on the REST root to check the service answers.
pub const REST_PROBE_RESOURCE: &str = "getGazetteerTypes.json";

impl Endpoint {
    /// URL of the lightweight existence check for this endpoint.
    ///
    /// It never carries a substantive request's filter or pagination.
    pub fn capabilities_url(&self) -> String {
        match self.protocol {
            Protocol::Wms => format!(
                "{}service=WMS&version=1.1.1&request=GetCapabilities",
                self.base_url
            ),
            Protocol::Wfs => format!(
                "{}service=WFS&version=2.0.0&request=GetCapabilities",
                self.base_url
            ),
            Protocol::Rest => format!("{}{}", self.base_url, REST_PROBE_RESOURCE),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.protocol, self.base_url)
    }
}

/// Turns descriptors into endpoints. Pure; never performs I/O.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    geoserver_root: String,
    rest_root: String,
}

impl EndpointResolver {
    pub fn new(geoserver_root: impl Into<String>, rest_root: impl Into<String>) -> Self {
        Self {
            geoserver_root: geoserver_root.into().trim_end_matches('/').to_string(),
            rest_root: rest_root.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.geoserver_root.clone(), config.rest_root.clone())
    }

    /// `<root>/<namespace>/wms?`, `<root>/<namespace>/wfs?`, or the REST root.
    pub fn resolve(&self, descriptor: &DataProductDescriptor, protocol: Protocol) -> Endpoint {
        let base_url = match protocol {
            Protocol::Wms => format!("{}/{}/wms?", self.geoserver_root, descriptor.namespace),
            Protocol::Wfs => format!("{}/{}/wfs?", self.geoserver_root, descriptor.namespace),
            Protocol::Rest => self.rest_base(),
        };
        Endpoint { protocol, base_url }
    }

    /// The gazetteer REST endpoint, which is not namespaced.
    pub fn rest(&self) -> Endpoint {
        Endpoint {
            protocol: Protocol::Rest,
            base_url: self.rest_base(),
        }
    }

    fn rest_base(&self) -> String {
        format!("{}/", self.rest_root)
    }
}
