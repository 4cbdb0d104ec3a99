//! Marine Regions client: networked half of the query pipeline.
//!
//! - capability probing and request dispatch over a pluggable transport
//! - normalization of tabular, geometry and linked-data payloads
//! - gazetteer lookups and relation graph resolution
//! - the [`MarineRegions`] facade tying it together

pub mod client;
pub mod dispatcher;
pub mod exception;
pub mod gazetteer;
pub mod normalize;
pub mod products;
pub mod prober;
pub mod relations;
pub mod telemetry;
pub mod transport;

pub use client::MarineRegions;
pub use dispatcher::{Dispatcher, RawPayload};
pub use exception::exception_text;
pub use gazetteer::{GazetteerClient, GazetteerRecord, NameSearch};
pub use normalize::{normalize, Geometry, NormalizedResult, Record, TaggedGeometry, Term, Triple};
pub use products::{parse_feature_schema, FeatureQuery, MapLayer, ProductClient};
pub use prober::CapabilityProber;
pub use relations::{
    filter_edges, interpret_edges, Direction, DirectionFilter, RelationEdge, RelationGraphResolver,
    RelationType, RelationTypeFilter,
};
pub use telemetry::init_tracing;
pub use transport::ReqwestTransport;

pub use mr_common::{MrError, MrResult, Mrgid, ServiceConfig};
