//! `MarineRegions`: the entry point wiring configuration, catalog and transport.

use std::sync::Arc;

use tracing::info;

use mr_common::{Catalog, HttpTransport, MrResult, ServiceConfig};
use mr_ogc::EndpointResolver;

use crate::dispatcher::Dispatcher;
use crate::gazetteer::GazetteerClient;
use crate::products::ProductClient;
use crate::relations::RelationGraphResolver;
use crate::transport::ReqwestTransport;

/// Owns the shared pieces and hands out per-concern clients.
///
/// Cloning is cheap; clones share the transport and its connection pool.
#[derive(Debug, Clone)]
pub struct MarineRegions {
    config: ServiceConfig,
    catalog: Arc<Catalog>,
    resolver: EndpointResolver,
    dispatcher: Arc<Dispatcher>,
}

impl MarineRegions {
    /// Client over HTTP with the built-in product catalog. The configuration
    /// is validated first.
    pub fn new(config: ServiceConfig) -> MrResult<Self> {
        let config = config.normalized()?;
        let transport = ReqwestTransport::new(&config)?;
        let catalog = Catalog::builtin()?;
        info!(
            geoserver_root = %config.geoserver_root,
            rest_root = %config.rest_root,
            products = catalog.len(),
            "Marine Regions client ready"
        );
        Ok(Self::with_transport(config, catalog, Arc::new(transport)))
    }

    /// Client over any transport, e.g. a scripted one in tests.
    pub fn with_transport(
        config: ServiceConfig,
        catalog: Catalog,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let resolver = EndpointResolver::from_config(&config);
        Self {
            config,
            catalog: Arc::new(catalog),
            resolver,
            dispatcher: Arc::new(Dispatcher::new(transport)),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn products(&self) -> ProductClient {
        ProductClient::new(self.catalog.clone(), self.resolver.clone(), self.dispatcher.clone())
    }

    pub fn gazetteer(&self) -> GazetteerClient {
        GazetteerClient::new(self.catalog.clone(), self.resolver.clone(), self.dispatcher.clone())
    }

    pub fn relations(&self) -> RelationGraphResolver {
        RelationGraphResolver::new(self.resolver.clone(), self.dispatcher.clone())
    }
}
