//! Common test utilities
//!
//! Provides an in-memory [`SearchBackend`] that answers the query shapes the
//! harvester issues and records every call for later assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use suggestion_harvester::search::{
    CollectionInfo, CollectionSchema, Document, FacetCounts, FacetValueCount, GroupedHit,
    ImportAction, ImportResult, SearchBackend, SearchError, SearchHit, SearchParams,
    SearchResponse, SearchResult,
};

/// Scripted search backend
#[derive(Default)]
pub struct FakeBackend {
    /// Facet field -> values returned by the extraction query
    pub facets: Vec<(String, Vec<String>)>,
    /// When set, the extraction query fails with this status
    pub facet_error: Option<StatusCode>,
    /// filter_by -> `found` for count-only queries (missing means 0)
    pub counts: HashMap<String, u64>,
    /// filter_by values whose count query fails
    pub failing_filters: HashSet<String>,
    /// filter_by -> sampled documents
    pub samples: HashMap<String, Vec<Value>>,
    /// group_by -> pages of groups
    pub grouped_pages: HashMap<String, Vec<Vec<GroupedHit>>>,
    /// group_by -> page number that fails
    pub failing_group_page: HashMap<String, u32>,
    /// Status returned by retrieve_collection (None means it exists)
    pub retrieve_status: Option<StatusCode>,
    /// Status returned by delete_by_filter (None means success)
    pub delete_status: Option<StatusCode>,
    /// 1-based import call that fails at transport level
    pub failing_import_call: Option<usize>,
    /// 1-based import call that rejects its first document
    pub rejecting_import_call: Option<usize>,

    pub searches: Mutex<Vec<(String, SearchParams)>>,
    pub imports: Mutex<Vec<(String, Vec<Value>, ImportAction)>>,
    pub deletes: Mutex<Vec<(String, String)>>,
    pub created: Mutex<Vec<CollectionSchema>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_facet(mut self, field: &str, values: &[&str]) -> Self {
        self.facets.push((
            field.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn with_count(mut self, filter: &str, found: u64) -> Self {
        self.counts.insert(filter.to_string(), found);
        self
    }

    pub fn with_failing_filter(mut self, filter: &str) -> Self {
        self.failing_filters.insert(filter.to_string());
        self
    }

    pub fn with_samples(mut self, filter: &str, documents: Vec<Value>) -> Self {
        self.samples.insert(filter.to_string(), documents);
        self
    }

    pub fn with_group_pages(mut self, group_by: &str, pages: Vec<Vec<GroupedHit>>) -> Self {
        self.grouped_pages.insert(group_by.to_string(), pages);
        self
    }

    pub fn search_calls(&self) -> Vec<(String, SearchParams)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn import_calls(&self) -> Vec<(String, Vec<Value>, ImportAction)> {
        self.imports.lock().unwrap().clone()
    }

    pub fn imported_documents(&self) -> Vec<Value> {
        self.import_calls()
            .into_iter()
            .flat_map(|(_, docs, _)| docs)
            .collect()
    }

    pub fn created_schemas(&self) -> Vec<CollectionSchema> {
        self.created.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<(String, String)> {
        self.deletes.lock().unwrap().clone()
    }

    fn facet_response(&self) -> SearchResponse {
        SearchResponse {
            facet_counts: self
                .facets
                .iter()
                .map(|(field, values)| FacetCounts {
                    field_name: field.clone(),
                    counts: values
                        .iter()
                        .map(|v| FacetValueCount {
                            value: v.clone(),
                            count: 1,
                        })
                        .collect(),
                })
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> SearchResult<SearchResponse> {
        self.searches
            .lock()
            .unwrap()
            .push((collection.to_string(), params.clone()));

        if params.facet_by.is_some() {
            if let Some(status) = self.facet_error {
                return Err(SearchError::status(status, "facet query failed"));
            }
            return Ok(self.facet_response());
        }

        if let Some(group_by) = &params.group_by {
            if self.failing_group_page.get(group_by) == Some(&params.page) {
                return Err(SearchError::status(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "page failed",
                ));
            }
            let groups = self
                .grouped_pages
                .get(group_by)
                .and_then(|pages| pages.get(params.page as usize - 1))
                .cloned()
                .unwrap_or_default();
            return Ok(SearchResponse {
                found: groups.len() as u64,
                grouped_hits: groups,
                page: params.page,
                ..Default::default()
            });
        }

        let filter = params.filter_by.clone().unwrap_or_default();

        if params.per_page == 0 {
            if self.failing_filters.contains(&filter) {
                return Err(SearchError::status(StatusCode::BAD_REQUEST, "bad filter"));
            }
            return Ok(SearchResponse {
                found: self.counts.get(&filter).copied().unwrap_or(0),
                ..Default::default()
            });
        }

        if self.failing_filters.contains(&filter) {
            return Err(SearchError::status(StatusCode::BAD_REQUEST, "bad filter"));
        }

        let documents = self.samples.get(&filter).cloned().unwrap_or_default();
        let hits: Vec<SearchHit> = documents
            .into_iter()
            .take(params.per_page as usize)
            .map(|doc| SearchHit {
                document: as_document(doc),
            })
            .collect();

        Ok(SearchResponse {
            found: hits.len() as u64,
            hits,
            page: params.page,
            ..Default::default()
        })
    }

    async fn import_documents(
        &self,
        collection: &str,
        documents: &[Value],
        action: ImportAction,
    ) -> SearchResult<Vec<ImportResult>> {
        let call = {
            let mut imports = self.imports.lock().unwrap();
            if self.failing_import_call == Some(imports.len() + 1) {
                return Err(SearchError::status(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "import unavailable",
                ));
            }
            imports.push((collection.to_string(), documents.to_vec(), action));
            imports.len()
        };

        Ok(documents
            .iter()
            .enumerate()
            .map(|(i, _)| {
                if self.rejecting_import_call == Some(call) && i == 0 {
                    ImportResult {
                        success: false,
                        error: Some("A document with id 1 already exists.".to_string()),
                        document: None,
                    }
                } else {
                    ImportResult {
                        success: true,
                        error: None,
                        document: None,
                    }
                }
            })
            .collect())
    }

    async fn delete_by_filter(&self, collection: &str, filter_by: &str) -> SearchResult<u64> {
        self.deletes
            .lock()
            .unwrap()
            .push((collection.to_string(), filter_by.to_string()));
        match self.delete_status {
            Some(status) => Err(SearchError::status(status, "delete failed")),
            None => Ok(3),
        }
    }

    async fn create_collection(&self, schema: &CollectionSchema) -> SearchResult<CollectionInfo> {
        self.created.lock().unwrap().push(schema.clone());
        Ok(CollectionInfo {
            name: schema.name.clone(),
            num_documents: 0,
        })
    }

    async fn retrieve_collection(&self, name: &str) -> SearchResult<CollectionInfo> {
        match self.retrieve_status {
            Some(status) => Err(SearchError::status(status, "retrieve failed")),
            None => Ok(CollectionInfo {
                name: name.to_string(),
                num_documents: 3,
            }),
        }
    }
}

/// A group holding the given documents
pub fn group(documents: Vec<Value>) -> GroupedHit {
    GroupedHit {
        group_key: vec![],
        hits: documents
            .into_iter()
            .map(|doc| SearchHit {
                document: as_document(doc),
            })
            .collect(),
    }
}

/// A page of single-document groups with the given display names
pub fn display_name_page(names: &[&str]) -> Vec<GroupedHit> {
    names
        .iter()
        .map(|name| group(vec![json!({ "displayname": name })]))
        .collect()
}

pub fn as_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}
