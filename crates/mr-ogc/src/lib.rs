//! OGC query construction for Marine Regions services.
//!
//! Covers the local, network-free half of a query:
//! - filter building (CQL / OGC Filter XML, mutually exclusive)
//! - endpoint resolution (WMS, WFS, gazetteer REST)
//! - request composition (pagination, output formats, URL encoding)

pub mod endpoint;
pub mod filter;
pub mod format;
pub mod request;

pub use endpoint::{Endpoint, EndpointResolver, Protocol};
pub use filter::{decode_component, encode_component, validate_columns, FilterExpression, FilterText};
pub use format::{ResponseFormat, Shape};
pub use request::{wms_base_url, Healthy, Operation, Pagination, ProbeState, QueryRequest};
