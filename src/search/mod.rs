//! Typesense access layer
//!
//! Everything the harvester knows about the search engine lives here:
//!
//! - **Backend trait**: [`SearchBackend`], the injected handle every component talks to
//! - **HTTP client**: [`TypesenseClient`], the production implementation over `reqwest`
//! - **Queries**: [`SearchParams`] plus helpers for building `filter_by` expressions
//! - **Wire types**: search, import and delete responses; collection schemas
//! - **Paging**: [`GroupedPager`], a bounded, restartable page sequence
//!
//! # Example
//!
//! ```no_run
//! use suggestion_harvester::search::{SearchBackend, SearchParams, TypesenseClient, TypesenseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TypesenseClient::new(&TypesenseConfig::default())?;
//!
//!     let params = SearchParams::new("displayname")
//!         .with_filter("category:=Rings")
//!         .count_only();
//!
//!     let response = client.search("consumer-products", &params).await?;
//!     println!("{} rings in stock", response.found);
//!
//!     Ok(())
//! }
//! ```

mod backend;
mod client;
mod config;
mod error;
mod pager;
mod query;
mod response;
mod schema;

pub use backend::{ImportAction, SearchBackend};
pub use client::TypesenseClient;
pub use config::TypesenseConfig;
pub use error::{SearchError, SearchResult};
pub use pager::GroupedPager;
pub use query::{all_of, exact_match, filter_value, is_filterable, SearchParams};
pub use response::{
    integer_field, string_field, DeleteResponse, Document, FacetCounts, FacetValueCount,
    GroupedHit, ImportResult, SearchHit, SearchResponse,
};
pub use schema::{CollectionInfo, CollectionSchema, FieldSchema};
