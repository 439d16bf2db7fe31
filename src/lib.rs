//! Catalog suggestion harvester
//!
//! Mines a Typesense product catalog for attribute values, validates
//! attribute combinations against live inventory and publishes the result
//! as an autocomplete suggestion collection.
//!
//! ## Modules
//!
//! - **`search`**: the Typesense client, its backend trait, query building and paging.
//! - **`suggestions`**: extraction, identifier resolution, generation and sync.
//! - **`config`**: layered configuration (embedded defaults, file, environment).
//! - **`telemetry`**: tracing subscriber setup.
//! - **`error`**: application error type.

pub mod config;
pub mod error;
pub mod search;
pub mod suggestions;
pub mod telemetry;

pub use error::{AppError, Result};
