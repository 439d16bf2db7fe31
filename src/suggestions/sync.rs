//! Upload of suggestions into the output collection

use crate::error::{AppError, Result};
use crate::search::{CollectionSchema, FieldSchema, ImportAction, SearchBackend};
use crate::suggestions::models::{Suggestion, SuggestionDocument};
use serde::Serialize;
use tracing::{error, info};

/// Largest batch accepted by a single import call
pub const MAX_BATCH_SIZE: usize = 100;

/// Filter matching every stored suggestion
const WIPE_FILTER: &str = "type:!=null";

/// Outcome of a completed sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub collection: String,
    pub deleted: u64,
    pub imported: usize,
    pub batches: usize,
    pub created_collection: bool,
}

/// Schema of the output collection
pub fn suggestion_schema(collection: &str) -> CollectionSchema {
    CollectionSchema::new(collection)
        .field(FieldSchema::string("term"))
        .field(FieldSchema::string("type").faceted())
        .field(FieldSchema::int32("boost"))
        .field(FieldSchema::string("target"))
        .sorted_by("boost")
}

/// Documents for the combined list, numbered from 1 by position
pub fn build_documents(
    generated: &[Suggestion],
    overrides: &[Suggestion],
) -> Vec<SuggestionDocument> {
    generated
        .iter()
        .chain(overrides.iter())
        .enumerate()
        .map(|(index, suggestion)| SuggestionDocument::from_suggestion(index + 1, suggestion))
        .collect()
}

/// Replaces the contents of the output collection
pub struct Synchronizer<'a> {
    backend: &'a dyn SearchBackend,
    batch_size: usize,
}

impl<'a> Synchronizer<'a> {
    /// Batch sizes are clamped to `1..=MAX_BATCH_SIZE`
    pub fn new(backend: &'a dyn SearchBackend, batch_size: usize) -> Self {
        Self {
            backend,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Ensure the schema, wipe prior contents and import everything.
    ///
    /// A failed batch aborts the run; batches already imported stay in place
    /// until the next run wipes them.
    pub async fn sync(
        &self,
        generated: &[Suggestion],
        overrides: &[Suggestion],
        output_collection: &str,
    ) -> Result<SyncReport> {
        info!(collection = output_collection, "Syncing suggestions to Typesense");

        let mut report = SyncReport {
            collection: output_collection.to_string(),
            ..Default::default()
        };

        report.created_collection = self.ensure_collection(output_collection).await?;
        report.deleted = self.clear_collection(output_collection).await?;

        let documents = build_documents(generated, overrides);
        info!(total = documents.len(), "Total suggestions to sync");

        for (batch_index, batch) in documents.chunks(self.batch_size).enumerate() {
            let payload = batch
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let results = self
                .backend
                .import_documents(output_collection, &payload, ImportAction::Create)
                .await
                .map_err(|e| {
                    error!(batch = batch_index + 1, error = %e, "Import failed");
                    AppError::Sync(format!("batch {} failed: {}", batch_index + 1, e))
                })?;

            let failures: Vec<_> = results.iter().filter(|r| !r.success).collect();
            if let Some(first) = failures.first() {
                let message = first.error.clone().unwrap_or_else(|| "unknown error".to_string());
                error!(
                    batch = batch_index + 1,
                    failed = failures.len(),
                    error = %message,
                    "Import rejected documents"
                );
                return Err(AppError::Sync(format!(
                    "batch {} rejected {} of {} documents: {}",
                    batch_index + 1,
                    failures.len(),
                    batch.len(),
                    message
                )));
            }

            report.batches += 1;
            report.imported += batch.len();
            info!(batch = batch_index + 1, count = batch.len(), "Imported batch");
        }

        info!(
            collection = output_collection,
            imported = report.imported,
            "Successfully synced all suggestions"
        );
        Ok(report)
    }

    /// Create the collection when missing; returns whether it was created
    async fn ensure_collection(&self, collection: &str) -> Result<bool> {
        match self.backend.retrieve_collection(collection).await {
            Ok(_) => {
                info!(collection, "Collection already exists");
                Ok(false)
            }
            Err(e) if e.is_not_found() => {
                info!(collection, "Creating collection");
                self.backend
                    .create_collection(&suggestion_schema(collection))
                    .await?;
                info!(collection, "Collection created");
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every stored suggestion; a missing target counts as empty
    async fn clear_collection(&self, collection: &str) -> Result<u64> {
        info!(collection, "Clearing existing suggestions");
        match self.backend.delete_by_filter(collection, WIPE_FILTER).await {
            Ok(deleted) => Ok(deleted),
            Err(e) if e.is_not_found() => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestions::models::SuggestionType;

    #[test]
    fn test_schema_shape() {
        let schema = suggestion_schema("search_suggestions");
        assert_eq!(schema.default_sorting_field.as_deref(), Some("boost"));
        assert_eq!(schema.fields.len(), 4);
        assert!(schema.fields.iter().any(|f| f.name == "type" && f.facet));
        assert!(schema
            .fields
            .iter()
            .any(|f| f.name == "boost" && f.field_type == "int32"));
    }

    #[test]
    fn test_documents_numbered_across_both_lists() {
        let generated = vec![
            Suggestion::new(SuggestionType::Category, "Rings", Some("category:Rings".into())),
            Suggestion::new(SuggestionType::Displayname, "Halo Ring", None),
        ];
        let overrides = vec![Suggestion::new(
            SuggestionType::Custom("manual".into()),
            "Gift Cards",
            Some("category:Gifts".into()),
        )];

        let docs = build_documents(&generated, &overrides);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(docs[1].target, "");
        assert_eq!(docs[2].kind, "manual");
    }

    #[test]
    fn test_batch_size_clamped() {
        let client = crate::search::TypesenseClient::new(&Default::default()).unwrap();
        assert_eq!(Synchronizer::new(&client, 500).batch_size(), MAX_BATCH_SIZE);
        assert_eq!(Synchronizer::new(&client, 0).batch_size(), 1);
        assert_eq!(Synchronizer::new(&client, 25).batch_size(), 25);
    }
}
