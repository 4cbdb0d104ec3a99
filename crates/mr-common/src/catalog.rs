//! Data product catalog: product id to namespace/layer/schema.
//!
//! The catalog is loaded once (from the built-in table or a YAML file) and
//! is read-only afterwards. Products address a geoserver resource as
//! `namespace:layer`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MrError, MrResult};

const BUILTIN_PRODUCTS: &str = include_str!("../catalog/products.yaml");

/// Attribute type declared for a product column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Double,
    Boolean,
    Date,
    DateTime,
    Geometry,
    Other(String),
}

impl ColumnType {
    /// Map an XSD/GML type name (as found in DescribeFeatureType) to a column type.
    pub fn from_xsd(type_name: &str) -> Self {
        let local = type_name.rsplit(':').next().unwrap_or(type_name);
        match local {
            "string" | "token" | "anyURI" => ColumnType::String,
            "int" | "integer" | "long" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" => ColumnType::Integer,
            "double" | "float" | "decimal" => ColumnType::Double,
            "boolean" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "dateTime" => ColumnType::DateTime,
            t if t.ends_with("PropertyType") => ColumnType::Geometry,
            other => ColumnType::Other(other.to_string()),
        }
    }
}

/// A single declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: ColumnType,
}

/// Ordered column declarations for a product.
///
/// An empty schema means "unknown": validation against it is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductSchema {
    columns: Vec<ColumnSpec>,
}

impl ProductSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// An undeclared schema.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.name == column)
    }

    pub fn type_of(&self, column: &str) -> Option<&ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| &c.data_type)
    }
}

/// A data product as known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProductDescriptor {
    /// Unique product identifier (e.g. "eez")
    pub id: String,

    /// Geoserver workspace (e.g. "MarineRegions")
    pub namespace: String,

    /// Layer name inside the namespace
    pub layer: String,

    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,

    /// Declared attribute schema; empty when the catalog has none
    #[serde(default)]
    pub schema: ProductSchema,
}

impl DataProductDescriptor {
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        layer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            layer: layer.into(),
            title: None,
            schema: ProductSchema::unknown(),
        }
    }

    pub fn with_schema(mut self, schema: ProductSchema) -> Self {
        self.schema = schema;
        self
    }

    /// The qualified OGC type name, `namespace:layer`.
    pub fn type_name(&self) -> String {
        format!("{}:{}", self.namespace, self.layer)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<DataProductDescriptor>,
}

/// Immutable registry of data products.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<DataProductDescriptor>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and duplicate `namespace:layer` pairs.
    pub fn new(products: Vec<DataProductDescriptor>) -> MrResult<Self> {
        let mut by_id = HashMap::with_capacity(products.len());
        let mut type_names = HashMap::with_capacity(products.len());

        for (idx, product) in products.iter().enumerate() {
            if product.id.is_empty() || product.namespace.is_empty() || product.layer.is_empty() {
                return Err(MrError::Config(format!(
                    "Catalog entry {} has an empty id, namespace or layer",
                    idx
                )));
            }
            if by_id.insert(product.id.clone(), idx).is_some() {
                return Err(MrError::Config(format!(
                    "Duplicate data product id: {}",
                    product.id
                )));
            }
            if let Some(other) = type_names.insert(product.type_name(), &product.id) {
                return Err(MrError::Config(format!(
                    "Data products '{}' and '{}' both address {}",
                    other,
                    product.id,
                    product.type_name()
                )));
            }
        }

        Ok(Self { products, by_id })
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> MrResult<Self> {
        Self::from_yaml_str(BUILTIN_PRODUCTS)
    }

    pub fn from_yaml_str(yaml: &str) -> MrResult<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        debug!(products = file.products.len(), "Loaded data product catalog");
        Self::new(file.products)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> MrResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MrError::Config(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Resolve a product id to its descriptor.
    pub fn resolve(&self, product_id: &str) -> MrResult<&DataProductDescriptor> {
        self.by_id
            .get(product_id)
            .map(|&idx| &self.products[idx])
            .ok_or_else(|| MrError::UnknownProduct(product_id.to_string()))
    }

    /// Declared schema for a product; unknown (empty) if none is declared
    /// or the product is not registered. Never fails.
    pub fn schema_of(&self, product_id: &str) -> ProductSchema {
        self.resolve(product_id)
            .map(|p| p.schema.clone())
            .unwrap_or_default()
    }

    /// All products in declaration order.
    pub fn products(&self) -> &[DataProductDescriptor] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.is_empty());

        let ecs = catalog.resolve("ecs").unwrap();
        assert_eq!(ecs.namespace, "MarineRegions");
        assert_eq!(ecs.layer, "eez_boundaries_ecs");
    }

    #[test]
    fn test_column_type_from_xsd() {
        assert_eq!(ColumnType::from_xsd("xsd:string"), ColumnType::String);
        assert_eq!(ColumnType::from_xsd("xsd:int"), ColumnType::Integer);
        assert_eq!(ColumnType::from_xsd("xsd:double"), ColumnType::Double);
        assert_eq!(
            ColumnType::from_xsd("gml:MultiSurfacePropertyType"),
            ColumnType::Geometry
        );
        assert_eq!(
            ColumnType::from_xsd("xsd:hexBinary"),
            ColumnType::Other("hexBinary".to_string())
        );
    }

    #[test]
    fn test_type_name() {
        let p = DataProductDescriptor::new("eez", "MarineRegions", "eez");
        assert_eq!(p.type_name(), "MarineRegions:eez");
    }
}
