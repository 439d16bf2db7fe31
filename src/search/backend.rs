//! Search backend abstraction

use crate::search::error::SearchResult;
use crate::search::query::SearchParams;
use crate::search::response::{ImportResult, SearchResponse};
use crate::search::schema::{CollectionInfo, CollectionSchema};
use async_trait::async_trait;
use serde_json::Value;
use strum::{Display, EnumString};

/// Write mode for document imports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ImportAction {
    Create,
}

/// Operations the harvester needs from a search engine.
///
/// Every component receives the backend as an explicit handle so that tests
/// can substitute an in-memory double.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a search against a collection
    async fn search(&self, collection: &str, params: &SearchParams)
        -> SearchResult<SearchResponse>;

    /// Import documents, returning one result per document
    async fn import_documents(
        &self,
        collection: &str,
        documents: &[Value],
        action: ImportAction,
    ) -> SearchResult<Vec<ImportResult>>;

    /// Delete every document matching a filter, returning the number removed
    async fn delete_by_filter(&self, collection: &str, filter_by: &str) -> SearchResult<u64>;

    /// Create a collection
    async fn create_collection(&self, schema: &CollectionSchema) -> SearchResult<CollectionInfo>;

    /// Fetch collection metadata; a missing collection is a not-found error
    async fn retrieve_collection(&self, name: &str) -> SearchResult<CollectionInfo>;
}
