//! Search parameter building and filter expressions

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Parameters of a `documents/search` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Query text (`*` matches everything)
    pub q: String,

    /// Comma-separated fields the query text runs against
    pub query_by: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_by_weights: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_facet_values: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_fields: Option<String>,

    /// 1-based page number
    pub page: u32,

    /// Hits per page; zero computes counts and facets only
    pub per_page: u32,
}

impl SearchParams {
    /// Create a match-all query against the given fields
    pub fn new(query_by: impl Into<String>) -> Self {
        Self {
            q: "*".to_string(),
            query_by: query_by.into(),
            query_by_weights: None,
            filter_by: None,
            facet_by: None,
            max_facet_values: None,
            group_by: None,
            group_limit: None,
            include_fields: None,
            page: 1,
            per_page: 10,
        }
    }

    pub fn with_weights(mut self, weights: impl Into<String>) -> Self {
        self.query_by_weights = Some(weights.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter_by = Some(filter.into());
        self
    }

    pub fn with_facets(mut self, facet_by: impl Into<String>, max_values: u32) -> Self {
        self.facet_by = Some(facet_by.into());
        self.max_facet_values = Some(max_values);
        self
    }

    /// Collapse hits sharing `field` into groups of at most `limit` hits
    pub fn with_grouping(mut self, field: impl Into<String>, limit: u32) -> Self {
        self.group_by = Some(field.into());
        self.group_limit = Some(limit);
        self
    }

    pub fn with_include_fields(mut self, fields: impl Into<String>) -> Self {
        self.include_fields = Some(fields.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Count-only variant: no hits are returned, only `found` and facets
    pub fn count_only(self) -> Self {
        self.with_page(1).with_per_page(0)
    }

    /// Flatten into URL query pairs in a stable order
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("q", self.q.clone()), ("query_by", self.query_by.clone())];

        let optional = [
            ("query_by_weights", self.query_by_weights.clone()),
            ("filter_by", self.filter_by.clone()),
            ("facet_by", self.facet_by.clone()),
            ("max_facet_values", self.max_facet_values.map(|v| v.to_string())),
            ("group_by", self.group_by.clone()),
            ("group_limit", self.group_limit.map(|v| v.to_string())),
            ("include_fields", self.include_fields.clone()),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );

        pairs.push(("page", self.page.to_string()));
        pairs.push(("per_page", self.per_page.to_string()));
        pairs
    }
}

/// True when `value` survives quoting unchanged. Backticks cannot be
/// escaped inside a quoted filter value.
pub fn is_filterable(value: &str) -> bool {
    !value.contains('`')
}

/// Quote a filter value when it contains characters Typesense would
/// otherwise treat as syntax.
///
/// Backticks are stripped, which changes the value; callers that need an
/// exact match check [`is_filterable`] first.
pub fn filter_value(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if plain {
        value.to_string()
    } else if is_filterable(value) {
        format!("`{}`", value)
    } else {
        warn!(value, "Stripping backticks from filter value");
        format!("`{}`", value.replace('`', ""))
    }
}

/// Exact-match clause, e.g. `category:=Rings`
pub fn exact_match(field: &str, value: &str) -> String {
    format!("{}:={}", field, filter_value(value))
}

/// Join clauses with `&&`
pub fn all_of<I, S>(clauses: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    clauses
        .into_iter()
        .map(|c| c.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" && ")
}
