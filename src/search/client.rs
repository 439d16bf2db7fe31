//! Typesense HTTP client

use crate::search::backend::{ImportAction, SearchBackend};
use crate::search::config::TypesenseConfig;
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::SearchParams;
use crate::search::response::{DeleteResponse, ImportResult, SearchResponse};
use crate::search::schema::{CollectionInfo, CollectionSchema};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

/// Client for a single Typesense node
#[derive(Clone)]
pub struct TypesenseClient {
    http: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl TypesenseClient {
    /// Create a client from connection settings
    pub fn new(config: &TypesenseConfig) -> SearchResult<Self> {
        if config.host.trim().is_empty() {
            return Err(SearchError::InvalidConfiguration(
                "typesense host must not be empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.connection_timeout_secs))
            .user_agent(concat!("suggestion-harvester/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                SearchError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            api_key: config.api_key.clone(),
            timeout_secs: config.connection_timeout_secs,
        })
    }

    /// Point the client at an explicit base URL, e.g. a mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
    }

    /// Send a request and fail on non-success status codes
    async fn send(&self, builder: RequestBuilder) -> SearchResult<Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout(format!(
                    "request timed out after {} seconds",
                    self.timeout_secs
                ))
            } else {
                SearchError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(SearchError::status(status, body));
        }

        Ok(response)
    }
}

#[async_trait]
impl SearchBackend for TypesenseClient {
    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> SearchResult<SearchResponse> {
        debug!(
            collection,
            filter_by = params.filter_by.as_deref().unwrap_or(""),
            page = params.page,
            per_page = params.per_page,
            "typesense search"
        );

        let builder = self
            .request(
                Method::GET,
                &format!("/collections/{}/documents/search", collection),
            )
            .query(&params.to_query_pairs());

        let response = self.send(builder).await?;
        Ok(response.json::<SearchResponse>().await?)
    }

    async fn import_documents(
        &self,
        collection: &str,
        documents: &[Value],
        action: ImportAction,
    ) -> SearchResult<Vec<ImportResult>> {
        let mut body = String::new();
        for document in documents {
            body.push_str(&serde_json::to_string(document)?);
            body.push('\n');
        }

        debug!(collection, count = documents.len(), %action, "typesense import");

        let builder = self
            .request(
                Method::POST,
                &format!("/collections/{}/documents/import", collection),
            )
            .query(&[("action", action.to_string())])
            .header("Content-Type", "text/plain")
            .body(body);

        let text = self.send(builder).await?.text().await?;

        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<ImportResult>(line).map_err(SearchError::from))
            .collect()
    }

    async fn delete_by_filter(&self, collection: &str, filter_by: &str) -> SearchResult<u64> {
        debug!(collection, filter_by, "typesense delete by filter");

        let builder = self
            .request(Method::DELETE, &format!("/collections/{}/documents", collection))
            .query(&[("filter_by", filter_by)]);

        let deleted = self.send(builder).await?.json::<DeleteResponse>().await?;
        Ok(deleted.num_deleted)
    }

    async fn create_collection(&self, schema: &CollectionSchema) -> SearchResult<CollectionInfo> {
        debug!(collection = %schema.name, "typesense create collection");

        let builder = self.request(Method::POST, "/collections").json(schema);
        Ok(self.send(builder).await?.json::<CollectionInfo>().await?)
    }

    async fn retrieve_collection(&self, name: &str) -> SearchResult<CollectionInfo> {
        let builder = self.request(Method::GET, &format!("/collections/{}", name));
        Ok(self.send(builder).await?.json::<CollectionInfo>().await?)
    }
}
