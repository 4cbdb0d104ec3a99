//! Relation Graph Resolver: directed place relations of a gazetteer entry.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use mr_common::{MrError, MrResult, Mrgid};
use mr_ogc::{EndpointResolver, Healthy, QueryRequest};

use crate::dispatcher::{Dispatcher, RawPayload};
use crate::normalize::Record;

const RECORD_RESOURCE: &str = "getGazetteerRecordByMRGID";
const RELATIONS_RESOURCE: &str = "getGazetteerRelationsByMRGID";

/// Kinds of place relation the gazetteer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    PartOf,
    PartlyPartOf,
    AdjacentTo,
    SimilarTo,
    AdministrativePartOf,
    InfluencedBy,
}

impl RelationType {
    pub const ALL: [RelationType; 6] = [
        RelationType::PartOf,
        RelationType::PartlyPartOf,
        RelationType::AdjacentTo,
        RelationType::SimilarTo,
        RelationType::AdministrativePartOf,
        RelationType::InfluencedBy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::PartOf => "partof",
            RelationType::PartlyPartOf => "partlypartof",
            RelationType::AdjacentTo => "adjacentto",
            RelationType::SimilarTo => "similarto",
            RelationType::AdministrativePartOf => "administrativepartof",
            RelationType::InfluencedBy => "influencedby",
        }
    }

    /// Lenient parse: case, spaces, `_` and `-` are ignored, as is an `is` prefix
    /// ("Is part of" reads as `partof`).
    pub fn parse(text: &str) -> Option<Self> {
        let key: String = text
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        let key = key.strip_prefix("is").unwrap_or(&key);
        RelationType::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an edge relative to the queried entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upper,
    Lower,
}

impl Direction {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "upper" => Some(Direction::Upper),
            "lower" => Some(Direction::Lower),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upper => f.write_str("upper"),
            Direction::Lower => f.write_str("lower"),
        }
    }
}

/// Requested relation type: one kind or `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationTypeFilter {
    #[default]
    All,
    Only(RelationType),
}

impl RelationTypeFilter {
    pub fn matches(&self, relation_type: RelationType) -> bool {
        match self {
            RelationTypeFilter::All => true,
            RelationTypeFilter::Only(wanted) => *wanted == relation_type,
        }
    }
}

impl FromStr for RelationTypeFilter {
    type Err = MrError;

    fn from_str(s: &str) -> MrResult<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(RelationTypeFilter::All);
        }
        RelationType::parse(s)
            .map(RelationTypeFilter::Only)
            .ok_or_else(|| MrError::invalid_parameter("relation_type", format!("unknown relation type '{}'", s)))
    }
}

/// Requested direction: `upper`, `lower` or `both`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionFilter {
    #[default]
    Both,
    Upper,
    Lower,
}

impl DirectionFilter {
    pub fn matches(&self, direction: Direction) -> bool {
        match self {
            DirectionFilter::Both => true,
            DirectionFilter::Upper => direction == Direction::Upper,
            DirectionFilter::Lower => direction == Direction::Lower,
        }
    }
}

impl FromStr for DirectionFilter {
    type Err = MrError;

    fn from_str(s: &str) -> MrResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "both" => Ok(DirectionFilter::Both),
            "upper" => Ok(DirectionFilter::Upper),
            "lower" => Ok(DirectionFilter::Lower),
            _ => Err(MrError::invalid_parameter(
                "direction",
                format!("expected upper, lower or both, got '{}'", s),
            )),
        }
    }
}

/// One directed relation. Derived per query; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RelationEdge {
    pub source_id: Mrgid,
    pub target_id: Mrgid,
    pub relation_type: RelationType,
    pub direction: Direction,
}

/// Fetches and filters relation edges from the gazetteer REST service.
#[derive(Debug, Clone)]
pub struct RelationGraphResolver {
    resolver: EndpointResolver,
    dispatcher: Arc<Dispatcher>,
}

impl RelationGraphResolver {
    pub fn new(resolver: EndpointResolver, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            resolver,
            dispatcher,
        }
    }

    /// Relation edges of `mrgid` matching both filters, in server order.
    ///
    /// Fails with `UnknownIdentifier` when the gazetteer has no record for
    /// `mrgid`; an existing record without relations yields an empty list.
    #[instrument(skip(self))]
    pub async fn relations(
        &self,
        mrgid: Mrgid,
        relation_type: RelationTypeFilter,
        direction: DirectionFilter,
    ) -> MrResult<Vec<RelationEdge>> {
        let endpoint = self.resolver.rest();
        let healthy = self.dispatcher.prober().probe(&endpoint).await?;

        self.ensure_record(mrgid, &healthy).await?;

        // Always fetch everything; filtering happens locally.
        let request = QueryRequest::rest(endpoint, RELATIONS_RESOURCE, [mrgid.to_string()])
            .with_param("direction", "both")
            .with_param("type", "all")
            .probed(healthy);

        let records = match optional(self.dispatcher.dispatch(request).await)? {
            Some(payload) => payload
                .normalize()?
                .into_records()
                .unwrap_or_default(),
            None => Vec::new(),
        };

        let fetched = interpret_edges(mrgid, &records)?;
        let edges = filter_edges(fetched, relation_type, direction);
        debug!(records = records.len(), edges = edges.len(), "Relations resolved");
        Ok(edges)
    }

    async fn ensure_record(&self, mrgid: Mrgid, healthy: &Healthy) -> MrResult<()> {
        let request = QueryRequest::rest(healthy.endpoint.clone(), RECORD_RESOURCE, [mrgid.to_string()])
            .probed(healthy.clone());

        match optional(self.dispatcher.dispatch(request).await)? {
            Some(_) => Ok(()),
            None => Err(MrError::UnknownIdentifier(mrgid.get())),
        }
    }
}

/// Treat "not found" and "no content" answers as absence.
pub(crate) fn optional(result: MrResult<RawPayload>) -> MrResult<Option<RawPayload>> {
    match result {
        Ok(payload) if payload.is_empty() => Ok(None),
        Ok(payload) => Ok(Some(payload)),
        Err(MrError::RequestErrorStatus { status: 404, .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Turn relation records into edges from `source`.
///
/// Records with an unknown relation type or direction are skipped with a
/// warning. A record without a usable `MRGID` is a malformed payload.
pub fn interpret_edges(source: Mrgid, records: &[Record]) -> MrResult<Vec<RelationEdge>> {
    let mut edges = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let target_id = record
            .get("MRGID")
            .and_then(mrgid_value)
            .ok_or_else(|| {
                MrError::malformed("JSON", format!("relation {} has no valid MRGID", idx))
            })?;

        let raw_type = record.get("relationType").and_then(Value::as_str).unwrap_or("");
        let Some(relation_type) = RelationType::parse(raw_type) else {
            warn!(target_id = %target_id, relation_type = raw_type, "Skipping relation of unknown type");
            continue;
        };

        let raw_direction = record.get("direction").and_then(Value::as_str).unwrap_or("");
        let Some(direction) = Direction::parse(raw_direction) else {
            warn!(target_id = %target_id, direction = raw_direction, "Skipping relation with unknown direction");
            continue;
        };

        edges.push(RelationEdge {
            source_id: source,
            target_id,
            relation_type,
            direction,
        });
    }

    Ok(edges)
}

/// Keep edges matching both filters, dropping repeats of
/// `(target_id, relation_type, direction)` after their first occurrence.
pub fn filter_edges(
    edges: Vec<RelationEdge>,
    relation_type: RelationTypeFilter,
    direction: DirectionFilter,
) -> Vec<RelationEdge> {
    let mut seen = HashSet::new();
    edges
        .into_iter()
        .filter(|edge| relation_type.matches(edge.relation_type) && direction.matches(edge.direction))
        .filter(|edge| seen.insert((edge.target_id, edge.relation_type, edge.direction)))
        .collect()
}

fn mrgid_value(value: &Value) -> Option<Mrgid> {
    let id = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Mrgid::new(id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn mrgid(id: u64) -> Mrgid {
        Mrgid::new(id).unwrap()
    }

    fn sample() -> Vec<Record> {
        vec![
            record(json!({"MRGID": 2350, "relationType": "partof", "direction": "upper"})),
            record(json!({"MRGID": 2350, "relationType": "adjacentto", "direction": "upper"})),
            record(json!({"MRGID": 8371, "relationType": "partof", "direction": "lower"})),
            record(json!({"MRGID": 2350, "relationType": "partof", "direction": "upper"})),
            record(json!({"MRGID": "26567", "relationType": "Is part of", "direction": "upper"})),
        ]
    }

    #[test]
    fn test_relation_type_parse() {
        assert_eq!(RelationType::parse("partof"), Some(RelationType::PartOf));
        assert_eq!(RelationType::parse("Partly part of"), Some(RelationType::PartlyPartOf));
        assert_eq!(
            RelationType::parse("administrative_part_of"),
            Some(RelationType::AdministrativePartOf)
        );
        assert_eq!(RelationType::parse("overlaps"), None);
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("all".parse::<RelationTypeFilter>().unwrap(), RelationTypeFilter::All);
        assert_eq!(
            "partof".parse::<RelationTypeFilter>().unwrap(),
            RelationTypeFilter::Only(RelationType::PartOf)
        );
        assert!("nearby".parse::<RelationTypeFilter>().is_err());
        assert_eq!("BOTH".parse::<DirectionFilter>().unwrap(), DirectionFilter::Both);
        assert!("sideways".parse::<DirectionFilter>().is_err());
    }

    #[test]
    fn test_interpret_skips_unknown_types() {
        let mut records = sample();
        records.push(record(json!({"MRGID": 1, "relationType": "overlaps", "direction": "upper"})));
        records.push(record(json!({"MRGID": 2, "relationType": "partof", "direction": "sideways"})));
        let edges = interpret_edges(mrgid(3293), &records).unwrap();
        assert_eq!(edges.len(), 5);
        assert!(edges.iter().all(|e| e.source_id == mrgid(3293)));
        assert_eq!(edges[4].target_id, mrgid(26567));
    }

    #[test]
    fn test_interpret_requires_mrgid() {
        let records = vec![record(json!({"relationType": "partof", "direction": "upper"}))];
        assert!(matches!(
            interpret_edges(mrgid(3293), &records),
            Err(MrError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_partof_upper_filters_everything_else() {
        let edges = interpret_edges(mrgid(3293), &sample()).unwrap();
        let filtered = filter_edges(
            edges,
            RelationTypeFilter::Only(RelationType::PartOf),
            DirectionFilter::Upper,
        );
        assert_eq!(filtered.len(), 2);
        assert!(filtered
            .iter()
            .all(|e| e.relation_type == RelationType::PartOf && e.direction == Direction::Upper));
        assert_eq!(filtered[0].target_id, mrgid(2350));
        assert_eq!(filtered[1].target_id, mrgid(26567));
    }

    #[test]
    fn test_all_both_is_superset_of_every_filter() {
        let edges = interpret_edges(mrgid(3293), &sample()).unwrap();
        let everything = filter_edges(edges.clone(), RelationTypeFilter::All, DirectionFilter::Both);
        assert_eq!(everything.len(), 4);

        for relation_type in RelationType::ALL {
            for direction in [DirectionFilter::Upper, DirectionFilter::Lower] {
                let subset = filter_edges(edges.clone(), RelationTypeFilter::Only(relation_type), direction);
                for edge in &subset {
                    assert!(everything.contains(edge));
                    assert_eq!(edge.relation_type, relation_type);
                    assert!(direction.matches(edge.direction));
                }
            }
        }
    }
}
