//! Data product queries: features over WFS, schemas, WMS layer contracts.

use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use tracing::{debug, instrument};

use mr_common::{Catalog, ColumnSpec, ColumnType, MrError, MrResult, ProductSchema};
use mr_ogc::{
    validate_columns, wms_base_url, EndpointResolver, FilterExpression, Healthy, Pagination,
    Protocol, QueryRequest, ResponseFormat,
};

use crate::dispatcher::Dispatcher;
use crate::normalize::NormalizedResult;

/// Options of a feature query. At most one of `cql` and `xml` may be set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureQuery {
    pub cql: Option<String>,
    pub xml: Option<String>,
    /// Restrict the returned columns; checked against the declared schema
    pub properties: Vec<String>,
    pub pagination: Option<Pagination>,
    pub format: Option<ResponseFormat>,
}

impl FeatureQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cql(mut self, cql: impl Into<String>) -> Self {
        self.cql = Some(cql.into());
        self
    }

    pub fn xml(mut self, xml: impl Into<String>) -> Self {
        self.xml = Some(xml.into());
        self
    }

    pub fn properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn page(mut self, count: u32, offset: u32) -> Self {
        self.pagination = Some(Pagination::new(count, offset));
        self
    }

    pub fn format(mut self, format: ResponseFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// What an external tile renderer needs to draw a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    /// `namespace:layer`, the WMS `layers` value
    pub layer_name: String,
    /// WMS base URL with the filter parameter already appended
    pub base_url: String,
    #[serde(skip)]
    pub healthy: Healthy,
}

#[derive(Debug, Clone)]
pub struct ProductClient {
    catalog: Arc<Catalog>,
    resolver: EndpointResolver,
    dispatcher: Arc<Dispatcher>,
}

impl ProductClient {
    pub fn new(catalog: Arc<Catalog>, resolver: EndpointResolver, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            catalog,
            resolver,
            dispatcher,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fetch and normalize features of a product.
    ///
    /// Product, filter and column errors are raised before any network
    /// activity. The result shape follows the requested format (GeoJSON
    /// records by default).
    #[instrument(skip(self, query))]
    pub async fn fetch(&self, product_id: &str, query: FeatureQuery) -> MrResult<NormalizedResult> {
        let descriptor = self.catalog.resolve(product_id)?;
        let filter = FilterExpression::build(query.cql.as_deref(), query.xml.as_deref())?;
        validate_columns(product_id, &descriptor.schema, &query.properties)?;

        let endpoint = self.resolver.resolve(descriptor, Protocol::Wfs);
        let mut request = QueryRequest::get_feature(endpoint, descriptor.type_name())
            .with_filter(filter)
            .with_properties(query.properties);
        if let Some(format) = query.format {
            request = request.with_format(format);
        }
        if let Some(page) = query.pagination {
            request = request.with_pagination(page);
        }

        let result = self.dispatcher.dispatch(request).await?.normalize()?;
        debug!(records = result.len(), "Features fetched");
        Ok(result)
    }

    /// Columns of a product: the declared schema, or the server's
    /// DescribeFeatureType answer when none is declared.
    #[instrument(skip(self))]
    pub async fn columns(&self, product_id: &str) -> MrResult<ProductSchema> {
        let descriptor = self.catalog.resolve(product_id)?;
        if !descriptor.schema.is_unknown() {
            return Ok(descriptor.schema.clone());
        }

        let endpoint = self.resolver.resolve(descriptor, Protocol::Wfs);
        let request = QueryRequest::describe_feature_type(endpoint, descriptor.type_name());
        let payload = self.dispatcher.dispatch(request).await?;
        parse_feature_schema(&payload.body)
    }

    /// Probe the product's WMS endpoint and describe the layer for a renderer.
    #[instrument(skip(self, cql, xml))]
    pub async fn map_layer(
        &self,
        product_id: &str,
        cql: Option<&str>,
        xml: Option<&str>,
    ) -> MrResult<MapLayer> {
        let descriptor = self.catalog.resolve(product_id)?;
        let filter = FilterExpression::build(cql, xml)?;
        let endpoint = self.resolver.resolve(descriptor, Protocol::Wms);
        let base_url = wms_base_url(&endpoint, &filter)?;

        let healthy = self.dispatcher.prober().probe(&endpoint).await?;
        Ok(MapLayer {
            layer_name: descriptor.type_name(),
            base_url,
            healthy,
        })
    }
}

/// Read the columns of a DescribeFeatureType XSD.
///
/// Columns are the `xsd:element` children declared inside the feature's
/// `complexType`; the top-level element declaring the feature is skipped.
pub fn parse_feature_schema(xsd: &[u8]) -> MrResult<ProductSchema> {
    let format = ResponseFormat::Gml;
    let malformed = |message: String| MrError::malformed(format!("{} schema", format), message);

    let mut reader = Reader::from_reader(xsd);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut saw_schema = false;
    let mut complex_depth = 0usize;
    let mut columns = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(e.to_string()))?;

        match event {
            Event::Start(e) | Event::Empty(e) if !saw_schema => {
                if e.local_name().as_ref() != b"schema" {
                    return Err(malformed("root element is not an XML schema".to_string()));
                }
                saw_schema = true;
            }
            Event::Start(e) if e.local_name().as_ref() == b"complexType" => complex_depth += 1,
            Event::End(e) if e.local_name().as_ref() == b"complexType" => {
                complex_depth = complex_depth.saturating_sub(1)
            }
            Event::Start(e) | Event::Empty(e)
                if complex_depth > 0 && e.local_name().as_ref() == b"element" =>
            {
                let mut name = None;
                let mut data_type = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| malformed(e.to_string()))?;
                    let value = attr
                        .unescape_value()
                        .map_err(|e| malformed(e.to_string()))?
                        .into_owned();
                    match attr.key.local_name().as_ref() {
                        b"name" => name = Some(value),
                        b"type" => data_type = Some(value),
                        _ => {}
                    }
                }
                if let Some(name) = name {
                    columns.push(ColumnSpec {
                        name,
                        data_type: data_type
                            .map(|t| ColumnType::from_xsd(&t))
                            .unwrap_or(ColumnType::Other("anyType".to_string())),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_schema {
        return Err(malformed("empty schema document".to_string()));
    }
    Ok(ProductSchema::new(columns))
}
