//! Common types shared across the Marine Regions query crates.

pub mod catalog;
pub mod config;
pub mod crs;
pub mod error;
pub mod transport;

pub use catalog::{Catalog, ColumnSpec, ColumnType, DataProductDescriptor, ProductSchema};
pub use config::{LoggingConfig, ServiceConfig};
pub use crs::{AxisOrder, Crs, CrsOrigin, CrsTag};
pub use error::{ErrorStage, MrError, MrResult};
pub use transport::{HttpResponse, HttpTransport, TransportFailure};

/// A gazetteer identifier (MRGID): an opaque positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Mrgid(u64);

impl Mrgid {
    pub fn new(id: u64) -> MrResult<Self> {
        if id == 0 {
            return Err(MrError::invalid_parameter(
                "mrgid",
                "MRGID must be a positive integer",
            ));
        }
        Ok(Self(id))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Mrgid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for Mrgid {
    type Error = MrError;

    fn try_from(id: u64) -> MrResult<Self> {
        Mrgid::new(id)
    }
}
