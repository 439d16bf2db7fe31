//! End-to-end generation run

use crate::config::{CollectionTargets, GenerationConfig};
use crate::error::Result;
use crate::search::{Document, SearchBackend, SearchParams};
use crate::suggestions::extractor::AttributeExtractor;
use crate::suggestions::generator::SuggestionGenerator;
use crate::suggestions::models::{AttributeMapping, AttributeSet, Suggestion};
use crate::suggestions::output::write_output;
use crate::suggestions::resolver::MappingResolver;
use crate::suggestions::sync::{SyncReport, Synchronizer};
use tracing::info;

/// Everything produced by one generation run
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub attributes: AttributeSet,
    pub mapping: AttributeMapping,
    /// Generated suggestions, without manual overrides
    pub generated: Vec<Suggestion>,
    /// Records written to the review file
    pub written: usize,
}

/// Extract, resolve, generate and write the review file
pub async fn run_generation(
    backend: &dyn SearchBackend,
    settings: &GenerationConfig,
    targets: &CollectionTargets,
    overrides: &[Suggestion],
) -> Result<GenerationOutcome> {
    let source = targets.source_collection.as_str();

    let attributes = AttributeExtractor::new(backend, settings.max_facet_values)
        .extract(source)
        .await?;

    let mapping = MappingResolver::new(backend, settings.sample_size)
        .resolve(&attributes, source)
        .await;

    let generated = SuggestionGenerator::new(
        backend,
        settings.display_name_page_size,
        settings.max_display_name_pages,
    )
    .generate(&attributes, &mapping, source)
    .await;

    info!(
        generated = generated.len(),
        overrides = overrides.len(),
        "Total suggestions (including manual overrides): {}",
        generated.len() + overrides.len()
    );

    let written = write_output(&targets.output_file, &generated, overrides)?;

    Ok(GenerationOutcome {
        attributes,
        mapping,
        generated,
        written,
    })
}

/// Generate, write the review file and push everything to the output collection
pub async fn run_sync(
    backend: &dyn SearchBackend,
    settings: &GenerationConfig,
    targets: &CollectionTargets,
    overrides: &[Suggestion],
) -> Result<SyncReport> {
    let outcome = run_generation(backend, settings, targets, overrides).await?;

    Synchronizer::new(backend, settings.batch_size)
        .sync(&outcome.generated, overrides, &targets.output_collection)
        .await
}

/// One sample document of the source collection, if it has any
pub async fn sample_document(
    backend: &dyn SearchBackend,
    source_collection: &str,
) -> Result<Option<Document>> {
    let params = SearchParams::new("displayname").with_per_page(1);
    let response = backend.search(source_collection, &params).await?;
    Ok(response.hits.into_iter().next().map(|hit| hit.document))
}
