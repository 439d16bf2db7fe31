//! Wire types returned by the search backend

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw stored document
pub type Document = Map<String, Value>;

/// Response of `documents/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Number of matching documents (or groups, when grouping)
    #[serde(default)]
    pub found: u64,

    /// Flat hits (ungrouped queries)
    #[serde(default)]
    pub hits: Vec<SearchHit>,

    /// Grouped hits (queries with `group_by`)
    #[serde(default)]
    pub grouped_hits: Vec<GroupedHit>,

    #[serde(default)]
    pub facet_counts: Vec<FacetCounts>,

    #[serde(default)]
    pub page: u32,
}

impl SearchResponse {
    /// Distinct values of a facet, or an empty list when the facet is absent
    pub fn facet_values(&self, field_name: &str) -> Vec<String> {
        self.facet_counts
            .iter()
            .find(|facet| facet.field_name == field_name)
            .map(|facet| facet.counts.iter().map(|c| c.value.clone()).collect())
            .unwrap_or_default()
    }

    /// Documents from flat hits
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.hits.iter().map(|hit| &hit.document)
    }
}

/// A single search hit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub document: Document,
}

/// One group of hits sharing a `group_by` key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupedHit {
    #[serde(default)]
    pub group_key: Vec<Value>,

    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

impl GroupedHit {
    /// Representative document of the group
    pub fn first_document(&self) -> Option<&Document> {
        self.hits.first().map(|hit| &hit.document)
    }
}

/// Facet value counts for one field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetCounts {
    pub field_name: String,

    #[serde(default)]
    pub counts: Vec<FacetValueCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetValueCount {
    pub value: String,

    #[serde(default)]
    pub count: u64,
}

/// Per-document line of an import response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// Response of a delete-by-filter request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub num_deleted: u64,
}

/// Read a string field, ignoring blanks
pub fn string_field<'a>(document: &'a Document, field: &str) -> Option<&'a str> {
    document
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Read an integer field; numeric strings are accepted
pub fn integer_field(document: &Document, field: &str) -> Option<i64> {
    match document.get(field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
