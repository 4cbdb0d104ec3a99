//! Gazetteer lookups over the REST service, plus entry geometries over WFS.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use mr_common::{Catalog, MrError, MrResult, Mrgid};
use mr_ogc::{EndpointResolver, FilterExpression, Protocol, QueryRequest, ResponseFormat};

use crate::dispatcher::Dispatcher;
use crate::normalize::{Record, TaggedGeometry};
use crate::relations::optional;

/// Catalog product holding the gazetteer's polygons.
pub const GAZETTEER_GEOMETRY_PRODUCT: &str = "gazetteer_polygon";

/// One gazetteer entry as served by the REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GazetteerRecord {
    #[serde(rename = "MRGID")]
    pub mrgid: Mrgid,
    #[serde(default)]
    pub gazetteer_source: Option<String>,
    #[serde(default)]
    pub place_type: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub min_latitude: Option<f64>,
    #[serde(default)]
    pub min_longitude: Option<f64>,
    #[serde(default)]
    pub max_latitude: Option<f64>,
    #[serde(default)]
    pub max_longitude: Option<f64>,
    #[serde(default)]
    pub precision: Option<f64>,
    pub preferred_gazetteer_name: String,
    #[serde(default)]
    pub preferred_gazetteer_name_lang: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// MRGID of the accepted entry when this one is an alternative
    #[serde(default)]
    pub accepted: Option<u64>,
    /// Fields not modelled above, in server order
    #[serde(flatten)]
    pub other: Record,
}

impl GazetteerRecord {
    pub fn from_record(record: Record) -> MrResult<Self> {
        serde_json::from_value(Value::Object(record))
            .map_err(|e| MrError::malformed("JSON", format!("gazetteer record: {}", e)))
    }

    /// True when this entry is the accepted one (not a synonym).
    pub fn is_accepted(&self) -> bool {
        self.accepted.map_or(true, |id| id == self.mrgid.get())
    }
}

/// Options of a name search.
#[derive(Debug, Clone, PartialEq)]
pub struct NameSearch {
    /// Match names containing the term rather than equal to it
    pub like: bool,
    /// Tolerate spelling differences
    pub fuzzy: bool,
    /// Restrict to one place type id
    pub type_id: Option<u32>,
    /// Skip this many results
    pub offset: u32,
}

impl Default for NameSearch {
    fn default() -> Self {
        Self {
            like: true,
            fuzzy: false,
            type_id: None,
            offset: 0,
        }
    }
}

/// Gazetteer client.
#[derive(Debug, Clone)]
pub struct GazetteerClient {
    catalog: Arc<Catalog>,
    resolver: EndpointResolver,
    dispatcher: Arc<Dispatcher>,
}

impl GazetteerClient {
    pub fn new(catalog: Arc<Catalog>, resolver: EndpointResolver, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            catalog,
            resolver,
            dispatcher,
        }
    }

    /// The record for `mrgid`, or `UnknownIdentifier`.
    #[instrument(skip(self))]
    pub async fn record(&self, mrgid: Mrgid) -> MrResult<GazetteerRecord> {
        let request = QueryRequest::rest(
            self.resolver.rest(),
            "getGazetteerRecordByMRGID",
            [mrgid.to_string()],
        );

        let payload = optional(self.dispatcher.dispatch(request).await)?
            .ok_or(MrError::UnknownIdentifier(mrgid.get()))?;
        let record = payload
            .normalize()?
            .into_records()
            .and_then(|records| records.into_iter().next())
            .ok_or(MrError::UnknownIdentifier(mrgid.get()))?;

        GazetteerRecord::from_record(record)
    }

    /// Records whose name matches `name`. No match is an empty list.
    #[instrument(skip(self))]
    pub async fn search_by_name(&self, name: &str, search: NameSearch) -> MrResult<Vec<GazetteerRecord>> {
        if name.trim().is_empty() {
            return Err(MrError::invalid_parameter("name", "search term must not be empty"));
        }

        let mut request = QueryRequest::rest(self.resolver.rest(), "getGazetteerRecordsByName", [name])
            .with_param("like", search.like.to_string())
            .with_param("fuzzy", search.fuzzy.to_string());
        if let Some(type_id) = search.type_id {
            request = request.with_param("typeID", type_id.to_string());
        }
        if search.offset > 0 {
            request = request.with_param("offset", search.offset.to_string());
        }

        let records = match optional(self.dispatcher.dispatch(request).await)? {
            Some(payload) => payload.normalize()?.into_records().unwrap_or_default(),
            None => Vec::new(),
        };
        debug!(records = records.len(), "Name search completed");

        records.into_iter().map(GazetteerRecord::from_record).collect()
    }

    /// Names of every place type known to the gazetteer.
    #[instrument(skip(self))]
    pub async fn place_types(&self) -> MrResult<Vec<String>> {
        let request = QueryRequest::rest(self.resolver.rest(), "getGazetteerTypes", Vec::<String>::new());
        let records = self
            .dispatcher
            .dispatch(request)
            .await?
            .normalize()?
            .into_records()
            .unwrap_or_default();

        Ok(records
            .iter()
            .filter_map(|record| record.get("type").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Geometries of a gazetteer entry. Entries without a polygon yield none.
    #[instrument(skip(self))]
    pub async fn geometries(&self, mrgid: Mrgid) -> MrResult<Vec<TaggedGeometry>> {
        let descriptor = self.catalog.resolve(GAZETTEER_GEOMETRY_PRODUCT)?;
        let filter = FilterExpression::build(Some(&format!("mrgid={}", mrgid)), None)?;
        let endpoint = self.resolver.resolve(descriptor, Protocol::Wfs);

        let request = QueryRequest::get_feature(endpoint, descriptor.type_name())
            .with_filter(filter)
            .with_format(ResponseFormat::GeoJsonGeometry);

        let geometries = self
            .dispatcher
            .dispatch(request)
            .await?
            .normalize()?
            .into_geometries()
            .unwrap_or_default();
        debug!(geometries = geometries.len(), "Gazetteer geometries fetched");
        Ok(geometries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_rest_json() {
        let value = json!({
            "MRGID": 3293,
            "gazetteerSource": "Flanders Marine Institute (VLIZ)",
            "placeType": "EEZ",
            "latitude": 51.46,
            "longitude": 2.70,
            "preferredGazetteerName": "Belgian Exclusive Economic Zone",
            "preferredGazetteerNameLang": "English",
            "status": "standard",
            "accepted": 3293,
            "modificationDate": "2020-09-03T09:03:14.917Z"
        });
        let Value::Object(record) = value else { unreachable!() };
        let record = GazetteerRecord::from_record(record).unwrap();

        assert_eq!(record.mrgid.get(), 3293);
        assert_eq!(record.place_type.as_deref(), Some("EEZ"));
        assert!(record.is_accepted());
        assert_eq!(record.other["modificationDate"], "2020-09-03T09:03:14.917Z");
    }

    #[test]
    fn test_record_requires_name() {
        let Value::Object(record) = json!({"MRGID": 3293}) else { unreachable!() };
        assert!(matches!(
            GazetteerRecord::from_record(record),
            Err(MrError::MalformedPayload { .. })
        ));
    }
}
