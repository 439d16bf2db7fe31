//! Manual overrides and the review file

use crate::error::{AppError, Result};
use crate::suggestions::models::Suggestion;
use std::path::Path;
use tracing::{info, warn};

/// Load curated suggestions; a missing file means there are none
pub fn load_overrides(path: &Path) -> Result<Vec<Suggestion>> {
    if !path.exists() {
        warn!(path = %path.display(), "Manual overrides file not found, continuing without overrides");
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(path)?;
    let overrides: Vec<Suggestion> = serde_json::from_str(&raw).map_err(|e| {
        AppError::Validation(format!(
            "invalid manual overrides in {}: {}",
            path.display(),
            e
        ))
    })?;

    info!(path = %path.display(), count = overrides.len(), "Loaded manual overrides");
    Ok(overrides)
}

/// Write generated suggestions followed by the overrides as pretty JSON
pub fn write_output(
    path: &Path,
    generated: &[Suggestion],
    overrides: &[Suggestion],
) -> Result<usize> {
    let combined: Vec<&Suggestion> = generated.iter().chain(overrides.iter()).collect();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&combined)?)?;

    info!(path = %path.display(), total = combined.len(), "Suggestions written");
    Ok(combined.len())
}

/// Read a previously written review file
pub fn read_output(path: &Path) -> Result<Vec<Suggestion>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
