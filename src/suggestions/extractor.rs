//! Attribute extraction through a single faceted query

use crate::error::{AppError, Result};
use crate::search::{SearchBackend, SearchParams};
use crate::suggestions::models::{AttributeField, AttributeSet};
use strum::IntoEnumIterator;
use tracing::{error, info};

const QUERY_BY: &str = "category,searchTags,subCategory,occasion,collection,style";
const QUERY_BY_WEIGHTS: &str = "10,8,8,5,4,4";
const PRODUCT_KEY: &str = "pId";

/// Pulls the distinct values of every attribute field from the catalog
pub struct AttributeExtractor<'a> {
    backend: &'a dyn SearchBackend,
    max_facet_values: u32,
}

impl<'a> AttributeExtractor<'a> {
    pub fn new(backend: &'a dyn SearchBackend, max_facet_values: u32) -> Self {
        Self {
            backend,
            max_facet_values,
        }
    }

    /// Query parameters: no hits, every facet, one row per product
    pub fn facet_params(&self) -> SearchParams {
        SearchParams::new(QUERY_BY)
            .with_weights(QUERY_BY_WEIGHTS)
            .with_facets(AttributeField::facet_list(), self.max_facet_values)
            .with_grouping(PRODUCT_KEY, 1)
            .count_only()
    }

    /// Extract the attribute set; backend failures are fatal
    pub async fn extract(&self, source_collection: &str) -> Result<AttributeSet> {
        info!(collection = source_collection, "Extracting unique attributes via faceting");

        let response = self
            .backend
            .search(source_collection, &self.facet_params())
            .await
            .map_err(|e| {
                error!(collection = source_collection, error = %e, "Attribute extraction failed");
                AppError::Backend {
                    collection: source_collection.to_string(),
                    message: e.to_string(),
                }
            })?;

        let mut attributes = AttributeSet::default();
        for field in AttributeField::iter() {
            attributes.set_values(field, response.facet_values(field.field_name()));
        }

        info!(
            categories = attributes.categories.len(),
            sub_categories = attributes.sub_categories.len(),
            search_tags = attributes.search_tags.len(),
            metals = attributes.metals.len(),
            styles = attributes.styles.len(),
            occasions = attributes.occasions.len(),
            collections = attributes.collections.len(),
            "Extracted attributes"
        );

        Ok(attributes)
    }
}
