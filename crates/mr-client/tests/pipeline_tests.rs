//! End-to-end queries through the facade: products, gazetteer, relations.

use std::sync::Arc;

use serde_json::json;

use mr_client::{
    normalize, DirectionFilter, FeatureQuery, MarineRegions, NameSearch, RelationType,
    RelationTypeFilter, Term,
};
use mr_common::{Catalog, Crs, CrsTag, MrError, Mrgid, ServiceConfig};
use mr_ogc::{ResponseFormat, Shape};
use test_utils::fixtures::{capabilities, config, features, gazetteer, linked_data};
use test_utils::FakeTransport;

fn service_config() -> ServiceConfig {
    ServiceConfig {
        geoserver_root: config::GEOSERVER_ROOT.to_string(),
        rest_root: config::REST_ROOT.to_string(),
        ..ServiceConfig::default()
    }
}

fn client(transport: &Arc<FakeTransport>) -> MarineRegions {
    MarineRegions::with_transport(service_config(), Catalog::builtin().unwrap(), transport.clone())
}

fn wfs(body: &'static str) -> Arc<FakeTransport> {
    Arc::new(
        FakeTransport::new()
            .ok("request=GetCapabilities", capabilities::WFS)
            .ok("request=GetFeature", body)
            .ok("request=DescribeFeatureType", features::LME_XSD),
    )
}

fn rest() -> FakeTransport {
    FakeTransport::new().ok("getGazetteerTypes", capabilities::REST_TYPES)
}

fn mrgid(id: u64) -> Mrgid {
    Mrgid::new(id).unwrap()
}

// ============================================================================
// Data products
// ============================================================================

#[tokio::test]
async fn test_fetch_geojson_records() {
    let transport = wfs(features::EEZ_GEOJSON);
    let query = FeatureQuery::new().cql("iso_ter1='BEL'").page(10, 0);

    let result = client(&transport).products().fetch("eez", query).await.unwrap();
    assert_eq!(result.shape(), Shape::Tabular);

    let records = result.into_records().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["geoname"], "Belgian Exclusive Economic Zone");
    assert_eq!(records[0]["the_geom"]["type"], "MultiPolygon");

    let url = transport
        .calls()
        .into_iter()
        .find(|url| url.contains("GetFeature"))
        .unwrap();
    assert!(url.contains("count=10&startIndex=0"));
    assert!(url.ends_with("cql_filter=iso_ter1%3D%27BEL%27"));
}

#[tokio::test]
async fn test_fetch_as_plain_json_keeps_one_record_per_feature() {
    let transport = wfs(features::EEZ_GEOJSON);
    let query = FeatureQuery::new().format(ResponseFormat::Json);

    let records = client(&transport)
        .products()
        .fetch("eez", query)
        .await
        .unwrap()
        .into_records()
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["mrgid"], 3293);
    assert_eq!(records[1]["geoname"], "Dutch Exclusive Economic Zone");
    assert!(!records[0].contains_key("totalFeatures"));
    assert_eq!(transport.calls_matching("outputFormat=application%2Fjson"), 1);
}

#[tokio::test]
async fn test_fetch_gml_records() {
    let transport = wfs(features::EEZ_GML);
    let query = FeatureQuery::new().format(ResponseFormat::Gml);

    let records = client(&transport)
        .products()
        .fetch("eez", query)
        .await
        .unwrap()
        .into_records()
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["mrgid"], "3293");
    assert_eq!(records[0]["territory2"], serde_json::Value::Null);
    assert_eq!(records[0]["the_geom"], "51.1 2.5 51.4 3.4 51.9 2.2 51.1 2.5");
}

#[tokio::test]
async fn test_fetch_csv_with_properties() {
    let transport = wfs(features::EEZ_CSV);
    let query = FeatureQuery::new()
        .properties(["mrgid", "geoname", "territory1"])
        .format(ResponseFormat::Csv);

    let records = client(&transport)
        .products()
        .fetch("eez", query)
        .await
        .unwrap()
        .into_records()
        .unwrap();
    assert_eq!(records[1]["territory1"], "Netherlands");
    assert_eq!(transport.calls_matching("propertyName=mrgid%2Cgeoname%2Cterritory1"), 1);
}

#[tokio::test]
async fn test_payload_not_matching_format_is_malformed() {
    let transport = wfs("<html>maintenance</html>");
    let err = client(&transport)
        .products()
        .fetch("eez", FeatureQuery::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MrError::MalformedPayload { .. }));
}

#[tokio::test]
async fn test_declared_columns_need_no_request() {
    let transport = Arc::new(FakeTransport::new());
    let schema = client(&transport).products().columns("iho").await.unwrap();
    assert!(schema.contains("mrgid"));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_columns_from_describe_feature_type() {
    let transport = wfs(features::EEZ_GEOJSON);
    let schema = client(&transport).products().columns("lme").await.unwrap();

    let names: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["lme_number", "lme_name", "the_geom"]);
    assert_eq!(transport.calls_matching("typeNames=MarineRegions%3Alme"), 1);
}

#[tokio::test]
async fn test_map_layer() {
    let transport = Arc::new(FakeTransport::new().ok("wms?service=WMS", capabilities::WMS));

    let layer = client(&transport)
        .products()
        .map_layer("ecoregions", Some("realm='Temperate Northern Atlantic'"), None)
        .await
        .unwrap();

    assert_eq!(layer.layer_name, "Ecoregions:ecoregions");
    assert_eq!(
        layer.base_url,
        "https://geo.test/geoserver/Ecoregions/wms?cql_filter=realm%3D%27Temperate%20Northern%20Atlantic%27&"
    );
    assert_eq!(layer.healthy.status, 200);
}

// ============================================================================
// Gazetteer
// ============================================================================

#[tokio::test]
async fn test_gazetteer_record() {
    let transport = Arc::new(rest().ok("getGazetteerRecordByMRGID.json/3293/", gazetteer::RECORD_3293));

    let record = client(&transport).gazetteer().record(mrgid(3293)).await.unwrap();
    assert_eq!(record.preferred_gazetteer_name, "Belgian Exclusive Economic Zone");
    assert_eq!(record.place_type.as_deref(), Some("EEZ"));
    assert!(record.is_accepted());
}

#[tokio::test]
async fn test_gazetteer_record_unknown() {
    let transport = Arc::new(rest().status("getGazetteerRecordByMRGID.json/", 204, ""));

    let err = client(&transport).gazetteer().record(mrgid(999_999_999)).await.unwrap_err();
    assert!(matches!(err, MrError::UnknownIdentifier(999_999_999)));
}

#[tokio::test]
async fn test_search_by_name() {
    let transport = Arc::new(
        rest()
            .ok("getGazetteerRecordsByName.json/Belgian/", gazetteer::SEARCH_BELGIAN)
            .status("getGazetteerRecordsByName.json/", 404, ""),
    );
    let client = client(&transport);

    let records = client
        .gazetteer()
        .search_by_name("Belgian", NameSearch::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].mrgid, mrgid(14));

    let none = client
        .gazetteer()
        .search_by_name("Atlantis", NameSearch::default())
        .await
        .unwrap();
    assert!(none.is_empty());
    assert_eq!(transport.calls_matching("like=true&fuzzy=false"), 2);
}

#[tokio::test]
async fn test_place_types() {
    let transport = Arc::new(rest());
    let types = client(&transport).gazetteer().place_types().await.unwrap();
    assert_eq!(types[0], "EEZ");
    assert_eq!(types.len(), 3);
}

#[tokio::test]
async fn test_geometries_without_crs_get_default_tag() {
    let transport = wfs(features::POLYGON_NO_CRS);

    let geometries = client(&transport).gazetteer().geometries(mrgid(3293)).await.unwrap();
    assert_eq!(geometries.len(), 1);
    assert_eq!(geometries[0].crs, CrsTag::service_default());
    assert!(geometries[0].crs.is_default());
    assert_eq!(transport.calls_matching("cql_filter=mrgid%3D3293"), 1);
}

#[test]
fn test_wkt_without_crs_gets_default_tag() {
    let geometries = normalize(features::WKT_NO_CRS.as_bytes(), ResponseFormat::Wkt)
        .unwrap()
        .into_geometries()
        .unwrap();
    assert_eq!(geometries[0].crs.crs, Crs::Crs84);
    assert!(geometries[0].crs.is_default());
}

// ============================================================================
// Relations
// ============================================================================

fn relations_transport(relations_status: u16, relations_body: &'static str) -> Arc<FakeTransport> {
    Arc::new(
        rest()
            .ok("getGazetteerRecordByMRGID.json/3293/", gazetteer::RECORD_3293)
            .status("getGazetteerRecordByMRGID.json/", 404, "")
            .status("getGazetteerRelationsByMRGID.json/3293/", relations_status, relations_body),
    )
}

#[tokio::test]
async fn test_relations_partof_upper() {
    let transport = relations_transport(200, gazetteer::RELATIONS_3293);

    let edges = client(&transport)
        .relations()
        .relations(
            mrgid(3293),
            "partof".parse().unwrap(),
            "upper".parse().unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source_id, mrgid(3293));
    assert_eq!(edges[0].target_id, mrgid(2350));
    assert_eq!(edges[0].relation_type, RelationType::PartOf);
    assert_eq!(transport.calls_matching("?direction=both&type=all"), 1);
    // One probe shared by both REST calls.
    assert_eq!(transport.calls_matching("getGazetteerTypes"), 1);
}

#[tokio::test]
async fn test_relations_all_both_is_deduplicated_superset() {
    let transport = relations_transport(200, gazetteer::RELATIONS_3293);
    let relations = client(&transport).relations();

    let all = relations
        .relations(mrgid(3293), RelationTypeFilter::All, DirectionFilter::Both)
        .await
        .unwrap();
    // Six records: one repeat, one unknown type.
    assert_eq!(all.len(), 4);

    let lower = relations
        .relations(
            mrgid(3293),
            RelationTypeFilter::Only(RelationType::PartOf),
            DirectionFilter::Lower,
        )
        .await
        .unwrap();
    assert_eq!(lower.len(), 1);
    assert!(lower.iter().all(|edge| all.contains(edge)));
}

#[tokio::test]
async fn test_relations_of_unknown_identifier() {
    let transport = relations_transport(200, "[]");

    let err = client(&transport)
        .relations()
        .relations(mrgid(42), RelationTypeFilter::All, DirectionFilter::Both)
        .await
        .unwrap_err();
    assert!(matches!(err, MrError::UnknownIdentifier(42)));
    assert_eq!(transport.calls_matching("getGazetteerRelationsByMRGID"), 0);
}

#[tokio::test]
async fn test_record_without_relations_is_empty() {
    for (status, body) in [(200, "[]"), (204, ""), (404, "")] {
        let transport = relations_transport(status, body);
        let edges = client(&transport)
            .relations()
            .relations(mrgid(3293), RelationTypeFilter::All, DirectionFilter::Both)
            .await
            .unwrap();
        assert!(edges.is_empty(), "status {} should give no edges", status);
    }
}

// ============================================================================
// Linked data
// ============================================================================

#[test]
fn test_linked_data_renditions_agree() {
    let from_nt = normalize(linked_data::NTRIPLES.as_bytes(), ResponseFormat::NTriples)
        .unwrap()
        .into_triples()
        .unwrap();
    let from_rdf = normalize(linked_data::RDF_XML.as_bytes(), ResponseFormat::RdfXml)
        .unwrap()
        .into_triples()
        .unwrap();

    assert_eq!(from_nt, from_rdf);
    assert_eq!(from_nt[1].object, Term::Literal {
        value: "Belgian Exclusive Economic Zone".to_string(),
        datatype: None,
        language: Some("en".to_string()),
    });
}

#[test]
fn test_linked_data_keeps_repeated_triples_in_order() {
    let from_nt = normalize(linked_data::NTRIPLES_REPEATED.as_bytes(), ResponseFormat::NTriples)
        .unwrap()
        .into_triples()
        .unwrap();
    let from_rdf = normalize(linked_data::RDF_XML_REPEATED.as_bytes(), ResponseFormat::RdfXml)
        .unwrap()
        .into_triples()
        .unwrap();

    assert_eq!(from_nt.len(), 3);
    assert_eq!(from_nt[0], from_nt[2]);
    assert_ne!(from_nt[0], from_nt[1]);
    assert_eq!(from_nt, from_rdf);
}

#[test]
fn test_linked_data_serializes_with_term_kinds() {
    let triples = normalize(linked_data::NTRIPLES.as_bytes(), ResponseFormat::NTriples)
        .unwrap()
        .into_triples()
        .unwrap();
    let value = serde_json::to_value(&triples[2]).unwrap();
    assert_eq!(
        value,
        json!({
            "subject": {"kind": "iri", "value": "http://marineregions.org/mrgid/3293"},
            "predicate": "http://marineregions.org/ns/ontology#isPartOf",
            "object": {"kind": "iri", "value": "http://marineregions.org/mrgid/2350"}
        })
    );
}
