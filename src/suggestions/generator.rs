//! Suggestion generation with count-only validation

use crate::search::{
    all_of, exact_match, is_filterable, string_field, GroupedHit, GroupedPager, SearchBackend,
    SearchParams,
};
use crate::suggestions::models::{
    AttributeField, AttributeMapping, AttributeSet, Suggestion, SuggestionType,
};
use futures::{pin_mut, StreamExt};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

const VALIDATION_QUERY_BY: &str = "displayname";
const DISPLAY_NAME_FIELD: &str = "displayname";
const SLUG_FIELD: &str = "slug";
const PRODUCT_KEY: &str = "pId";

/// One candidate shape from the policy table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidatePolicy {
    /// A single attribute value on its own
    Single(AttributeField),
    /// `<qualifier> <base>` for every pair of values
    Pair {
        qualifier: AttributeField,
        base: AttributeField,
    },
}

/// Policy table in emission order. Display names are harvested separately.
pub const POLICY_TABLE: [(SuggestionType, CandidatePolicy); 7] = [
    (
        SuggestionType::Category,
        CandidatePolicy::Single(AttributeField::Category),
    ),
    (
        SuggestionType::OccasionCategory,
        CandidatePolicy::Pair {
            qualifier: AttributeField::Occasion,
            base: AttributeField::Category,
        },
    ),
    (
        SuggestionType::StyleCategory,
        CandidatePolicy::Pair {
            qualifier: AttributeField::Style,
            base: AttributeField::Category,
        },
    ),
    (
        SuggestionType::SubcategoryCategory,
        CandidatePolicy::Pair {
            qualifier: AttributeField::SubCategory,
            base: AttributeField::Category,
        },
    ),
    (
        SuggestionType::Style,
        CandidatePolicy::Single(AttributeField::Style),
    ),
    (
        SuggestionType::Collection,
        CandidatePolicy::Single(AttributeField::Collection),
    ),
    (
        SuggestionType::SearchTag,
        CandidatePolicy::Single(AttributeField::SearchTags),
    ),
];

/// A candidate awaiting validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: SuggestionType,
    pub term: String,
    /// `filter_by` expression used to confirm matching inventory
    pub filter: String,
    pub target: String,
}

impl Candidate {
    pub fn into_suggestion(self) -> Suggestion {
        Suggestion::new(self.kind, self.term, Some(self.target))
    }
}

/// Expand the policy table into candidates for the given attributes.
///
/// Values that cannot be expressed as an exact-match filter are skipped.
pub fn candidates(attributes: &AttributeSet, mapping: &AttributeMapping) -> Vec<Candidate> {
    let mut out = Vec::new();

    for field in [
        AttributeField::Category,
        AttributeField::SubCategory,
        AttributeField::Style,
        AttributeField::Occasion,
        AttributeField::Collection,
        AttributeField::SearchTags,
    ] {
        for value in attributes.values(field).iter().filter(|v| !is_filterable(v)) {
            warn!(field = field.field_name(), value = %value, "Skipping value that cannot be filtered");
        }
    }
    let filterable = |field: AttributeField| {
        attributes
            .values(field)
            .iter()
            .filter(|v| is_filterable(v))
            .collect::<Vec<_>>()
    };

    for (kind, policy) in POLICY_TABLE {
        match policy {
            CandidatePolicy::Single(field) => {
                for value in filterable(field) {
                    let term = match kind {
                        SuggestionType::Collection => format!("{} Collection", value),
                        _ => value.clone(),
                    };
                    out.push(Candidate {
                        kind: kind.clone(),
                        term,
                        filter: exact_match(field.field_name(), value),
                        target: mapping.target_part(field, value),
                    });
                }
            }
            CandidatePolicy::Pair { qualifier, base } => {
                for q in filterable(qualifier) {
                    for b in filterable(base) {
                        out.push(Candidate {
                            kind: kind.clone(),
                            term: format!("{} {}", q, b),
                            filter: all_of([
                                exact_match(qualifier.field_name(), q),
                                exact_match(base.field_name(), b),
                            ]),
                            target: format!(
                                "{},{}",
                                mapping.target_part(qualifier, q),
                                mapping.target_part(base, b)
                            ),
                        });
                    }
                }
            }
        }
    }

    out
}

/// Unique display names in first-seen order, each with the first slug seen
#[derive(Debug, Default)]
pub struct DisplayNameSet {
    order: Vec<String>,
    slugs: HashMap<String, Option<String>>,
}

impl DisplayNameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name; blanks are ignored and names compare after trimming
    pub fn insert(&mut self, name: &str, slug: Option<&str>) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        let slug = slug.map(str::trim).filter(|s| !s.is_empty());
        match self.slugs.get_mut(name) {
            Some(existing) => {
                if existing.is_none() {
                    *existing = slug.map(str::to_string);
                }
            }
            None => {
                self.order.push(name.to_string());
                self.slugs
                    .insert(name.to_string(), slug.map(str::to_string));
            }
        }
    }

    /// Record every hit of a page of groups
    pub fn extend_from_groups(&mut self, groups: &[GroupedHit]) {
        for hit in groups.iter().flat_map(|g| g.hits.iter()) {
            if let Some(name) = string_field(&hit.document, DISPLAY_NAME_FIELD) {
                self.insert(name, string_field(&hit.document, SLUG_FIELD));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_suggestions(mut self) -> Vec<Suggestion> {
        self.order
            .into_iter()
            .map(|name| {
                let target = self
                    .slugs
                    .remove(&name)
                    .flatten()
                    .map(|slug| format!("{}:{}", SLUG_FIELD, slug));
                Suggestion::new(SuggestionType::Displayname, name, target)
            })
            .collect()
    }
}

/// Validates candidate combinations against live inventory
pub struct SuggestionGenerator<'a> {
    backend: &'a dyn SearchBackend,
    display_name_page_size: u32,
    max_display_name_pages: u32,
}

impl<'a> SuggestionGenerator<'a> {
    pub fn new(
        backend: &'a dyn SearchBackend,
        display_name_page_size: u32,
        max_display_name_pages: u32,
    ) -> Self {
        Self {
            backend,
            display_name_page_size,
            max_display_name_pages,
        }
    }

    /// Generate every suggestion that has at least one matching product
    pub async fn generate(
        &self,
        attributes: &AttributeSet,
        mapping: &AttributeMapping,
        source_collection: &str,
    ) -> Vec<Suggestion> {
        info!(collection = source_collection, "Generating suggestions with faceted validation");

        let mut suggestions = Vec::new();
        let mut current: Option<SuggestionType> = None;

        for candidate in candidates(attributes, mapping) {
            if current.as_ref() != Some(&candidate.kind) {
                info!(kind = %candidate.kind, "Validating suggestions");
                current = Some(candidate.kind.clone());
            }

            if self.has_products(source_collection, &candidate.filter).await {
                suggestions.push(candidate.into_suggestion());
            }
        }

        let display_names = self.collect_display_names(source_collection).await;
        info!(count = display_names.len(), "Added displayname suggestions");
        suggestions.extend(display_names.into_suggestions());

        info!(total = suggestions.len(), "Generated suggestions");
        suggestions
    }

    /// Count-only query; errors count as "no products"
    pub async fn has_products(&self, source_collection: &str, filter: &str) -> bool {
        let params = SearchParams::new(VALIDATION_QUERY_BY)
            .with_filter(filter)
            .count_only();

        match self.backend.search(source_collection, &params).await {
            Ok(response) => {
                debug!(filter, found = response.found, "Validated filter");
                response.found > 0
            }
            Err(e) => {
                warn!(filter, error = %e, "Error checking filter");
                false
            }
        }
    }

    /// Page through one representative document per product
    pub async fn collect_display_names(&self, source_collection: &str) -> DisplayNameSet {
        let params = SearchParams::new(VALIDATION_QUERY_BY)
            .with_grouping(PRODUCT_KEY, 1)
            .with_per_page(self.display_name_page_size);

        let pager = GroupedPager::new(
            self.backend,
            source_collection,
            params,
            self.max_display_name_pages,
        );
        let pages = pager.into_stream();
        pin_mut!(pages);

        let mut names = DisplayNameSet::new();
        let mut page_number = 0u32;
        while let Some(page) = pages.next().await {
            match page {
                Ok(groups) => {
                    page_number += 1;
                    names.extend_from_groups(&groups);
                    debug!(
                        page = page_number,
                        groups = groups.len(),
                        unique = names.len(),
                        "Fetched displayname page"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Error fetching displaynames");
                    break;
                }
            }
        }

        if page_number == 0 {
            info!("No products found with displaynames");
        }

        names
    }
}
