//! Resolution of facet values to internal identifiers
//!
//! Categories and collections carry a single identifier per document, so one
//! grouped query per field yields a representative document for every value.
//!
//! Subcategories, occasions and styles store their identifiers as arrays on
//! each product (a product can belong to several of them). For those, up to
//! `sample_size` documents matching the value are fetched and their arrays
//! intersected: identifiers belonging to other values vary between documents
//! while the one for the queried value is shared by all of them. This is a
//! heuristic. A sample that is too small or inconsistent data can leave the
//! value unresolved, and several shared identifiers resolve to the first one
//! in the first document's order.

use crate::search::{
    exact_match, integer_field, is_filterable, string_field, Document, GroupedPager,
    SearchBackend, SearchParams,
};
use crate::suggestions::models::{AttributeField, AttributeMapping, AttributeSet};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

const GROUPED_PER_PAGE: u32 = 100;
const GROUPED_MAX_PAGES: u32 = 10;

/// Builds an [`AttributeMapping`] by sampling the source collection
pub struct MappingResolver<'a> {
    backend: &'a dyn SearchBackend,
    sample_size: u32,
}

impl<'a> MappingResolver<'a> {
    pub fn new(backend: &'a dyn SearchBackend, sample_size: u32) -> Self {
        Self {
            backend,
            sample_size,
        }
    }

    /// Resolve every attribute that has an identifier field.
    ///
    /// Never fails: anything that cannot be resolved is simply absent from
    /// the mapping.
    pub async fn resolve(
        &self,
        attributes: &AttributeSet,
        source_collection: &str,
    ) -> AttributeMapping {
        info!(collection = source_collection, "Resolving attribute IDs and slugs");

        let mut mapping = AttributeMapping::default();

        mapping.categories = self
            .resolve_grouped(source_collection, AttributeField::Category, |doc| {
                integer_field(doc, "cId")
            })
            .await;
        info!(resolved = mapping.categories.len(), "Resolved category IDs");

        mapping.collections = self
            .resolve_grouped(source_collection, AttributeField::Collection, |doc| {
                string_field(doc, "collectionSlug").map(str::to_string)
            })
            .await;
        info!(resolved = mapping.collections.len(), "Resolved collection slugs");

        mapping.sub_categories = self
            .resolve_sampled(
                source_collection,
                AttributeField::SubCategory,
                &attributes.sub_categories,
                numeric_ids,
            )
            .await;
        info!(resolved = mapping.sub_categories.len(), "Resolved subCategory IDs");

        mapping.occasions = self
            .resolve_sampled(
                source_collection,
                AttributeField::Occasion,
                &attributes.occasions,
                numeric_ids,
            )
            .await;
        info!(resolved = mapping.occasions.len(), "Resolved occasion IDs");

        mapping.styles = self
            .resolve_sampled(
                source_collection,
                AttributeField::Style,
                &attributes.styles,
                string_ids,
            )
            .await;
        info!(resolved = mapping.styles.len(), "Resolved style IDs");

        info!(
            resolved = mapping.resolved_count(),
            values = attributes.total_values(),
            "Attribute resolution finished"
        );
        mapping
    }

    /// One representative document per distinct value of `field`
    async fn resolve_grouped<T, F>(
        &self,
        collection: &str,
        field: AttributeField,
        read_id: F,
    ) -> BTreeMap<String, T>
    where
        F: Fn(&Document) -> Option<T>,
    {
        let mut resolved = BTreeMap::new();
        let Some(id_field) = field.id_field() else {
            return resolved;
        };

        let name = field.field_name();
        let params = SearchParams::new(name)
            .with_grouping(name, 1)
            .with_include_fields(format!("{},{}", name, id_field))
            .with_per_page(GROUPED_PER_PAGE);

        let mut pager = GroupedPager::new(self.backend, collection, params, GROUPED_MAX_PAGES);
        loop {
            match pager.next_page().await {
                Ok(Some(groups)) => {
                    for doc in groups.iter().filter_map(|g| g.first_document()) {
                        if let (Some(value), Some(id)) = (string_field(doc, name), read_id(doc)) {
                            resolved.entry(value.to_string()).or_insert(id);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!(field = name, error = %e, "Error resolving identifiers");
                    break;
                }
            }
        }

        resolved
    }

    /// Sample-and-intersect resolution for every value of `field`
    async fn resolve_sampled<T>(
        &self,
        collection: &str,
        field: AttributeField,
        values: &[String],
        read_ids: fn(&Value) -> Option<Vec<T>>,
    ) -> BTreeMap<String, T>
    where
        T: PartialEq + Clone + std::fmt::Debug,
    {
        let mut resolved = BTreeMap::new();
        for value in values {
            if let Some(id) = self
                .resolve_value(collection, field, value, read_ids)
                .await
            {
                resolved.insert(value.clone(), id);
            }
        }
        resolved
    }

    /// Resolve a single value; `None` when unresolved or on error
    pub async fn resolve_value<T>(
        &self,
        collection: &str,
        field: AttributeField,
        value: &str,
        read_ids: fn(&Value) -> Option<Vec<T>>,
    ) -> Option<T>
    where
        T: PartialEq + Clone + std::fmt::Debug,
    {
        let id_field = field.id_field()?;
        if !is_filterable(value) {
            warn!(field = field.field_name(), value, "Skipping value that cannot be filtered");
            return None;
        }

        let params = SearchParams::new(field.field_name())
            .with_filter(exact_match(field.field_name(), value))
            .with_include_fields(id_field)
            .with_per_page(self.sample_size);

        let response = match self.backend.search(collection, &params).await {
            Ok(response) => response,
            Err(e) => {
                warn!(field = field.field_name(), value, error = %e, "Error resolving value");
                return None;
            }
        };

        let arrays: Vec<Vec<T>> = response
            .documents()
            .filter_map(|doc| doc.get(id_field).and_then(read_ids))
            .collect();

        let candidates = intersect_identifiers(&arrays);
        debug!(
            field = field.field_name(),
            value,
            samples = arrays.len(),
            candidates = ?candidates,
            "Identifier intersection"
        );

        candidates.into_iter().next()
    }
}

/// Identifiers present in every array, in the order of the first array.
///
/// An empty input yields an empty result.
pub fn intersect_identifiers<T: PartialEq + Clone>(arrays: &[Vec<T>]) -> Vec<T> {
    let Some((first, rest)) = arrays.split_first() else {
        return Vec::new();
    };

    let mut intersection: Vec<T> = Vec::new();
    for id in first {
        if rest.iter().all(|ids| ids.contains(id)) && !intersection.contains(id) {
            intersection.push(id.clone());
        }
    }
    intersection
}

/// Integer identifier arrays; a lone number counts as a one-element array
pub fn numeric_ids(value: &Value) -> Option<Vec<i64>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(as_integer).collect()),
        Value::Number(_) | Value::String(_) => as_integer(value).map(|id| vec![id]),
        _ => None,
    }
}

/// String identifier arrays; anything other than an array is ignored
pub fn string_ids(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
