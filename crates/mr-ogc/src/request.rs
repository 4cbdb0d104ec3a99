//! Query requests and final URL composition.

use chrono::{DateTime, Utc};

use mr_common::{MrError, MrResult};

use crate::endpoint::{Endpoint, Protocol};
use crate::filter::{encode_component, FilterExpression};
use crate::format::ResponseFormat;

const WFS_VERSION: &str = "2.0.0";

/// Page selection. Maps to `count`/`startIndex` on WFS and `count`/`offset` on REST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub count: u32,
    pub offset: u32,
}

impl Pagination {
    pub fn new(count: u32, offset: u32) -> Self {
        Self { count, offset }
    }
}

/// Proof that an endpoint answered its capability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Healthy {
    pub endpoint: Endpoint,
    pub status: u16,
    pub checked_at: DateTime<Utc>,
}

impl Healthy {
    pub fn new(endpoint: Endpoint, status: u16) -> Self {
        Self {
            endpoint,
            status,
            checked_at: Utc::now(),
        }
    }

    pub fn covers(&self, endpoint: &Endpoint) -> bool {
        &self.endpoint == endpoint
    }
}

/// Whether the dispatcher still has to probe before the substantive request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProbeState {
    #[default]
    Required,
    Done(Healthy),
}

/// What is being asked of the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// WFS GetFeature on `namespace:layer`, optionally restricted to some properties
    GetFeature {
        type_name: String,
        property_names: Vec<String>,
    },
    /// WFS DescribeFeatureType on `namespace:layer`
    DescribeFeatureType { type_name: String },
    /// Gazetteer REST resource, e.g. `getGazetteerRecordByMRGID` with path `["3293"]`
    Rest {
        resource: String,
        path: Vec<String>,
    },
}

/// A fully specified request, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub endpoint: Endpoint,
    pub operation: Operation,
    pub filter: FilterExpression,
    pub pagination: Option<Pagination>,
    pub response_format: ResponseFormat,
    /// Additional raw (unencoded) query parameters
    pub params: Vec<(String, String)>,
    pub probe: ProbeState,
}

impl QueryRequest {
    fn new(endpoint: Endpoint, operation: Operation, response_format: ResponseFormat) -> Self {
        Self {
            endpoint,
            operation,
            filter: FilterExpression::None,
            pagination: None,
            response_format,
            params: Vec::new(),
            probe: ProbeState::Required,
        }
    }

    pub fn get_feature(endpoint: Endpoint, type_name: impl Into<String>) -> Self {
        Self::new(
            endpoint,
            Operation::GetFeature {
                type_name: type_name.into(),
                property_names: Vec::new(),
            },
            ResponseFormat::GeoJson,
        )
    }

    pub fn describe_feature_type(endpoint: Endpoint, type_name: impl Into<String>) -> Self {
        Self::new(
            endpoint,
            Operation::DescribeFeatureType {
                type_name: type_name.into(),
            },
            ResponseFormat::Gml,
        )
    }

    pub fn rest<I, S>(endpoint: Endpoint, resource: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            endpoint,
            Operation::Rest {
                resource: resource.into(),
                path: path.into_iter().map(Into::into).collect(),
            },
            ResponseFormat::Json,
        )
    }

    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn with_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Operation::GetFeature { property_names, .. } = &mut self.operation {
            property_names.extend(names.into_iter().map(Into::into));
        }
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Skip the dispatcher's probe; the caller already checked this endpoint.
    pub fn probed(mut self, healthy: Healthy) -> Self {
        self.probe = ProbeState::Done(healthy);
        self
    }

    /// Compose the final URL.
    ///
    /// Fails with `InvalidParameter` when the operation does not fit the
    /// endpoint protocol, the format cannot be requested, or a filter is
    /// attached to a REST request.
    pub fn to_url(&self) -> MrResult<String> {
        let mut query = QueryString::default();

        let mut url = match &self.operation {
            Operation::GetFeature {
                type_name,
                property_names,
            } => {
                self.require_protocol(Protocol::Wfs)?;
                let output_format = self.response_format.wfs_output_format().ok_or_else(|| {
                    MrError::invalid_parameter(
                        "outputFormat",
                        format!("{} cannot be requested from WFS", self.response_format),
                    )
                })?;

                query.push("service", "WFS");
                query.push("version", WFS_VERSION);
                query.push("request", "GetFeature");
                query.push("typeNames", type_name);
                query.push("outputFormat", output_format);
                if !property_names.is_empty() {
                    query.push("propertyName", &property_names.join(","));
                }
                if let Some(page) = self.pagination {
                    query.push("count", &page.count.to_string());
                    query.push("startIndex", &page.offset.to_string());
                }
                self.endpoint.base_url.clone()
            }
            Operation::DescribeFeatureType { type_name } => {
                self.require_protocol(Protocol::Wfs)?;
                query.push("service", "WFS");
                query.push("version", WFS_VERSION);
                query.push("request", "DescribeFeatureType");
                query.push("typeNames", type_name);
                self.endpoint.base_url.clone()
            }
            Operation::Rest { resource, path } => {
                self.require_protocol(Protocol::Rest)?;
                if !self.filter.is_none() {
                    return Err(MrError::invalid_parameter(
                        "filter",
                        "the gazetteer REST service does not accept server-side filters",
                    ));
                }
                let suffix = self.response_format.rest_suffix().ok_or_else(|| {
                    MrError::invalid_parameter(
                        "format",
                        format!("{} is not served by the gazetteer REST service", self.response_format),
                    )
                })?;

                let mut url = format!("{}{}.{}/", self.endpoint.base_url, resource, suffix);
                for segment in path {
                    url.push_str(&encode_component(segment));
                    url.push('/');
                }
                if let Some(page) = self.pagination {
                    query.push("count", &page.count.to_string());
                    query.push("offset", &page.offset.to_string());
                }
                if !self.params.is_empty() || !query.is_empty() {
                    url.push('?');
                }
                url
            }
        };

        // One filter parameter at most; FilterExpression cannot hold both.
        if let Some((name, value)) = self.filter.query_pair() {
            query.push_encoded(name, value);
        }
        for (name, value) in &self.params {
            query.push(name, value);
        }

        url.push_str(&query.finish());
        Ok(url)
    }

    fn require_protocol(&self, expected: Protocol) -> MrResult<()> {
        if self.endpoint.protocol != expected {
            return Err(MrError::invalid_parameter(
                "endpoint",
                format!(
                    "operation requires a {} endpoint, got {}",
                    expected, self.endpoint.protocol
                ),
            ));
        }
        Ok(())
    }
}

/// WMS base URL with the filter appended, for an external tile renderer.
///
/// The renderer adds its own GetMap parameters after this prefix.
pub fn wms_base_url(endpoint: &Endpoint, filter: &FilterExpression) -> MrResult<String> {
    if endpoint.protocol != Protocol::Wms {
        return Err(MrError::invalid_parameter(
            "endpoint",
            format!("map layers need a WMS endpoint, got {}", endpoint.protocol),
        ));
    }
    Ok(match filter.query_pair() {
        Some((name, value)) => format!("{}{}={}&", endpoint.base_url, name, value),
        None => endpoint.base_url.clone(),
    })
}

#[derive(Default)]
struct QueryString {
    pairs: Vec<String>,
}

impl QueryString {
    fn push(&mut self, name: &str, value: &str) {
        self.pairs.push(format!("{}={}", name, encode_component(value)));
    }

    fn push_encoded(&mut self, name: &str, encoded: String) {
        self.pairs.push(format!("{}={}", name, encoded));
    }

    fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn finish(self) -> String {
        self.pairs.join("&")
    }
}
