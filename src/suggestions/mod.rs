//! Suggestion harvesting
//!
//! The run is strictly sequential:
//!
//! ```text
//! AttributeExtractor ──► MappingResolver ──► SuggestionGenerator ──► review file ──► Synchronizer
//!   (one facet query)     (IDs and slugs)     (count-only checks)     (+ overrides)    (wipe + import)
//! ```
//!
//! Every stage receives the [`SearchBackend`](crate::search::SearchBackend)
//! handle explicitly.

mod extractor;
mod generator;
mod models;
mod output;
mod pipeline;
mod resolver;
mod sync;

pub use extractor::AttributeExtractor;
pub use generator::{
    candidates, Candidate, CandidatePolicy, DisplayNameSet, SuggestionGenerator, POLICY_TABLE,
};
pub use models::{
    normalize_values, AttributeField, AttributeMapping, AttributeSet, Suggestion,
    SuggestionDocument, SuggestionType, DEFAULT_BOOST,
};
pub use output::{load_overrides, read_output, write_output};
pub use pipeline::{run_generation, run_sync, sample_document, GenerationOutcome};
pub use resolver::{intersect_identifiers, numeric_ids, string_ids, MappingResolver};
pub use sync::{build_documents, suggestion_schema, SyncReport, Synchronizer, MAX_BATCH_SIZE};
