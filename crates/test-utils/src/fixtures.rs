//! Canned payloads mimicking the Marine Regions geoserver and gazetteer.
//!
//! Values are trimmed copies of real answers: the Belgian EEZ (MRGID 3293)
//! and its neighbours.

/// Service configuration pointing at hosts that only the fake transport knows.
pub mod config {
    pub const GEOSERVER_ROOT: &str = "https://geo.test/geoserver";
    pub const REST_ROOT: &str = "https://rest.test/rest";
}

/// Capability documents answered by healthy endpoints.
pub mod capabilities {
    pub const WFS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:WFS_Capabilities version="2.0.0" xmlns:wfs="http://www.opengis.net/wfs/2.0" xmlns:ows="http://www.opengis.net/ows/1.1">
  <ows:ServiceIdentification><ows:Title>Marine Regions WFS</ows:Title></ows:ServiceIdentification>
</wfs:WFS_Capabilities>"#;

    pub const WMS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMT_MS_Capabilities version="1.1.1">
  <Service><Name>OGC:WMS</Name><Title>Marine Regions WMS</Title></Service>
</WMT_MS_Capabilities>"#;

    /// `getGazetteerTypes.json`, also the REST probe resource
    pub const REST_TYPES: &str = r#"[
  {"typeID": 70, "type": "EEZ", "description": "Exclusive Economic Zone"},
  {"typeID": 4, "type": "Sea", "description": null},
  {"typeID": 6, "type": "Marine Ecoregion of the World (MEOW)", "description": null}
]"#;
}

/// OGC exception reports, delivered with HTTP 200 by geoserver.
pub mod exceptions {
    pub const SERVICE_EXCEPTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ServiceExceptionReport version="1.1.1">
  <ServiceException code="LayerNotDefined">Could not find layer MarineRegions:nope</ServiceException>
</ServiceExceptionReport>"#;

    pub const OWS_EXCEPTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1" version="2.0.0">
  <ows:Exception exceptionCode="InvalidParameterValue" locator="cql_filter">
    <ows:ExceptionText>Could not parse CQL filter list.</ows:ExceptionText>
  </ows:Exception>
</ows:ExceptionReport>"#;
}

/// Feature payloads for the `eez` product.
pub mod features {
    pub const EEZ_GEOJSON: &str = r#"{"type":"FeatureCollection","features":[
  {"type":"Feature","id":"eez.1","geometry_name":"the_geom",
   "geometry":{"type":"MultiPolygon","coordinates":[[[[2.5,51.1],[3.4,51.4],[2.2,51.9],[2.5,51.1]]]]},
   "properties":{"mrgid":3293,"geoname":"Belgian Exclusive Economic Zone","territory1":"Belgium","area_km2":3447}},
  {"type":"Feature","id":"eez.2","geometry_name":"the_geom",
   "geometry":{"type":"MultiPolygon","coordinates":[[[[3.3,51.4],[7.2,53.7],[4.0,55.8],[3.3,51.4]]]]},
   "properties":{"mrgid":5668,"geoname":"Dutch Exclusive Economic Zone","territory1":"Netherlands","area_km2":63699}}
],"totalFeatures":2,"crs":{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::4326"}}}"#;

    pub const EEZ_GML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs/2.0" xmlns:gml="http://www.opengis.net/gml/3.2"
    xmlns:MarineRegions="http://marineregions.org" numberMatched="1" numberReturned="1">
  <wfs:member>
    <MarineRegions:eez gml:id="eez.1">
      <MarineRegions:mrgid>3293</MarineRegions:mrgid>
      <MarineRegions:geoname>Belgian Exclusive Economic Zone</MarineRegions:geoname>
      <MarineRegions:territory2/>
      <MarineRegions:the_geom>
        <gml:MultiSurface srsName="urn:ogc:def:crs:EPSG::4326">
          <gml:surfaceMember><gml:Polygon><gml:exterior><gml:LinearRing>
            <gml:posList>51.1 2.5 51.4 3.4 51.9 2.2 51.1 2.5</gml:posList>
          </gml:LinearRing></gml:exterior></gml:Polygon></gml:surfaceMember>
        </gml:MultiSurface>
      </MarineRegions:the_geom>
    </MarineRegions:eez>
  </wfs:member>
</wfs:FeatureCollection>"#;

    pub const EEZ_CSV: &str = "FID,mrgid,geoname,territory1\n\
eez.1,3293,Belgian Exclusive Economic Zone,Belgium\n\
eez.2,5668,Dutch Exclusive Economic Zone,Netherlands\n";

    /// `gazetteer_polygon` answer without a `crs` member
    pub const POLYGON_NO_CRS: &str = r#"{"type":"FeatureCollection","features":[
  {"type":"Feature","id":"gazetteer_polygon.1",
   "geometry":{"type":"Polygon","coordinates":[[[2.5,51.1],[3.4,51.4],[2.2,51.9],[2.5,51.1]]]},
   "properties":{"mrgid":3293}}
]}"#;

    pub const WKT_NO_CRS: &str = "POLYGON ((2.5 51.1, 3.4 51.4, 2.2 51.9, 2.5 51.1))\n";

    pub const LME_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:gml="http://www.opengis.net/gml/3.2">
  <xsd:complexType name="lmeType">
    <xsd:complexContent><xsd:extension base="gml:AbstractFeatureType"><xsd:sequence>
      <xsd:element name="lme_number" type="xsd:int"/>
      <xsd:element name="lme_name" type="xsd:string"/>
      <xsd:element name="the_geom" type="gml:MultiSurfacePropertyType"/>
    </xsd:sequence></xsd:extension></xsd:complexContent>
  </xsd:complexType>
  <xsd:element name="lme" type="MarineRegions:lmeType"/>
</xsd:schema>"#;
}

/// Gazetteer REST answers.
pub mod gazetteer {
    pub const RECORD_3293: &str = r#"{"MRGID":3293,"gazetteerSource":"Flanders Marine Institute (VLIZ)","placeType":"EEZ",
"latitude":51.4633,"longitude":2.7019,"minLatitude":51.0926,"minLongitude":2.2384,"maxLatitude":51.8766,"maxLongitude":3.3700,
"precision":58530,"preferredGazetteerName":"Belgian Exclusive Economic Zone","preferredGazetteerNameLang":"English",
"status":"standard","accepted":3293}"#;

    pub const SEARCH_BELGIAN: &str = r#"[
{"MRGID":3293,"placeType":"EEZ","preferredGazetteerName":"Belgian Exclusive Economic Zone","status":"standard","accepted":3293},
{"MRGID":14,"placeType":"Nation","preferredGazetteerName":"Belgium","status":"standard","accepted":14}
]"#;

    /// Relations of MRGID 3293, including a repeat and an unknown type
    pub const RELATIONS_3293: &str = r#"[
{"MRGID":2350,"relationType":"partof","direction":"upper"},
{"MRGID":14,"relationType":"administrativepartof","direction":"upper"},
{"MRGID":5668,"relationType":"adjacentto","direction":"upper"},
{"MRGID":26567,"relationType":"partof","direction":"lower"},
{"MRGID":2350,"relationType":"partof","direction":"upper"},
{"MRGID":8371,"relationType":"overlaps","direction":"upper"}
]"#;
}

/// Linked-data renditions of MRGID 3293.
pub mod linked_data {
    pub const NTRIPLES: &str = r#"<http://marineregions.org/mrgid/3293> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://marineregions.org/ns/ontology#MRGeoObject> .
<http://marineregions.org/mrgid/3293> <http://www.w3.org/2004/02/skos/core#prefLabel> "Belgian Exclusive Economic Zone"@en .
<http://marineregions.org/mrgid/3293> <http://marineregions.org/ns/ontology#isPartOf> <http://marineregions.org/mrgid/2350> .
"#;

    pub const RDF_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:skos="http://www.w3.org/2004/02/skos/core#"
         xmlns:mr="http://marineregions.org/ns/ontology#">
  <mr:MRGeoObject rdf:about="http://marineregions.org/mrgid/3293">
    <skos:prefLabel xml:lang="en">Belgian Exclusive Economic Zone</skos:prefLabel>
    <mr:isPartOf rdf:resource="http://marineregions.org/mrgid/2350"/>
  </mr:MRGeoObject>
</rdf:RDF>"#;

    /// The same statement reported twice, as the gazetteer does for
    /// overlapping relation sources
    pub const NTRIPLES_REPEATED: &str = r#"<http://marineregions.org/mrgid/3293> <http://marineregions.org/ns/ontology#isPartOf> <http://marineregions.org/mrgid/2350> .
<http://marineregions.org/mrgid/3293> <http://www.w3.org/2004/02/skos/core#prefLabel> "Belgian Exclusive Economic Zone"@en .
<http://marineregions.org/mrgid/3293> <http://marineregions.org/ns/ontology#isPartOf> <http://marineregions.org/mrgid/2350> .
"#;

    pub const RDF_XML_REPEATED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:skos="http://www.w3.org/2004/02/skos/core#"
         xmlns:mr="http://marineregions.org/ns/ontology#">
  <rdf:Description rdf:about="http://marineregions.org/mrgid/3293">
    <mr:isPartOf rdf:resource="http://marineregions.org/mrgid/2350"/>
    <skos:prefLabel xml:lang="en">Belgian Exclusive Economic Zone</skos:prefLabel>
    <mr:isPartOf rdf:resource="http://marineregions.org/mrgid/2350"/>
  </rdf:Description>
</rdf:RDF>"#;
}
