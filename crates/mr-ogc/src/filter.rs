//! Server-side filter expressions (CQL text or OGC Filter XML).
//!
//! Filter text is opaque: it is never parsed, trimmed or reordered. The
//! builder centralizes the two rules that matter for the URL: only one
//! filter dialect per query, and percent-encoding of the text.

use std::borrow::Cow;

use mr_common::{MrError, MrResult, ProductSchema};

/// Query parameter carrying an ECQL filter.
pub const CQL_FILTER_PARAM: &str = "cql_filter";
/// Query parameter carrying an OGC Filter XML document.
pub const XML_FILTER_PARAM: &str = "filter";

/// Non-empty filter text. Its field is private: the only way to obtain
/// one is through [`FilterExpression::build`].
///
/// ```compile_fail
/// use mr_ogc::{FilterExpression, FilterText};
/// let filter = FilterExpression::CqlText(FilterText(String::new()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterText(String);

impl FilterText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated filter, at most one dialect per query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterExpression {
    #[default]
    None,
    CqlText(FilterText),
    OgcXml(FilterText),
}

impl FilterExpression {
    /// Build a filter from optional CQL and XML inputs.
    ///
    /// Empty strings count as absent. Supplying both fails with
    /// [`MrError::ConflictingFilter`] before anything is encoded.
    pub fn build(cql: Option<&str>, xml: Option<&str>) -> MrResult<Self> {
        let cql = cql.filter(|s| !s.is_empty());
        let xml = xml.filter(|s| !s.is_empty());

        match (cql, xml) {
            (Some(_), Some(_)) => Err(MrError::ConflictingFilter),
            (Some(cql), None) => Ok(FilterExpression::CqlText(FilterText(cql.to_string()))),
            (None, Some(xml)) => Ok(FilterExpression::OgcXml(FilterText(xml.to_string()))),
            (None, None) => Ok(FilterExpression::None),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FilterExpression::None)
    }

    /// The raw filter text as supplied.
    pub fn text(&self) -> Option<&str> {
        match self {
            FilterExpression::None => None,
            FilterExpression::CqlText(text) | FilterExpression::OgcXml(text) => Some(text.as_str()),
        }
    }

    /// Name of the query parameter this filter travels in.
    pub fn param_name(&self) -> Option<&'static str> {
        match self {
            FilterExpression::None => None,
            FilterExpression::CqlText(_) => Some(CQL_FILTER_PARAM),
            FilterExpression::OgcXml(_) => Some(XML_FILTER_PARAM),
        }
    }

    /// The `name=value` pair to append to a query string, value percent-encoded.
    pub fn query_pair(&self) -> Option<(&'static str, String)> {
        let name = self.param_name()?;
        let text = self.text()?;
        Some((name, encode_component(text)))
    }
}

/// Percent-encode a query component. Everything outside the RFC 3986
/// unreserved set is escaped, so the result is safe inside `a=b&c=d`.
pub fn encode_component(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

/// Inverse of [`encode_component`].
pub fn decode_component(encoded: &str) -> MrResult<Cow<'_, str>> {
    urlencoding::decode(encoded)
        .map_err(|e| MrError::invalid_parameter("filter", format!("invalid percent-encoding: {}", e)))
}

/// Check requested column names against a product's declared schema.
///
/// An unknown (empty) schema accepts every name.
pub fn validate_columns<S: AsRef<str>>(
    product_id: &str,
    schema: &ProductSchema,
    columns: &[S],
) -> MrResult<()> {
    if schema.is_unknown() {
        return Ok(());
    }
    for column in columns {
        let column = column.as_ref();
        if !schema.contains(column) {
            return Err(MrError::UnknownColumn {
                product: product_id.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}
