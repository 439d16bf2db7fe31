use crate::search::TypesenseConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use validator::Validate;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Typesense connection
    #[serde(default)]
    pub typesense: TypesenseConfig,

    /// Source/output collection naming
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// Generation and sync tuning
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// `$CONFIG_PATH`, when set, must point at an existing file. Otherwise
    /// `config/default.toml` is layered in if present.
    pub fn load() -> Result<Self, config::ConfigError> {
        match std::env::var("CONFIG_PATH") {
            Ok(config_path) => Self::load_from(&config_path),
            Err(_) => Self::build(DEFAULT_CONFIG_PATH, false),
        }
    }

    /// Load configuration, layering `config_path` over the built-in defaults.
    /// A missing file is an error.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::build(config_path, true)
    }

    fn build(config_path: &str, required: bool) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with the config file
            .add_source(config::File::with_name(config_path).required(required))
            // Override with environment variables (prefix: SUGGEST_)
            .add_source(
                config::Environment::with_prefix("SUGGEST")
                    .separator("__")
                    .try_parsing(true),
            )
            // Connection variables understood by the Typesense tooling
            .set_override_option("typesense.host", std::env::var("TYPESENSE_HOST").ok())?
            .set_override_option("typesense.port", std::env::var("TYPESENSE_PORT").ok())?
            .set_override_option(
                "typesense.protocol",
                std::env::var("TYPESENSE_PROTOCOL").ok(),
            )?
            .set_override_option("typesense.api_key", std::env::var("TYPESENSE_API_KEY").ok())?
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// Catalog mined when no `--collection` is given
    #[serde(default = "default_source_collection")]
    pub default_source: String,

    /// Explicit output collection names keyed by source collection
    #[serde(default = "default_custom_outputs")]
    pub custom_output_collections: HashMap<String, String>,

    /// Curated suggestions merged into every run
    #[serde(default = "default_overrides_path")]
    pub overrides_path: PathBuf,

    /// Directory receiving the review file
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            default_source: default_source_collection(),
            custom_output_collections: default_custom_outputs(),
            overrides_path: default_overrides_path(),
            output_dir: default_output_dir(),
        }
    }
}

impl CollectionsConfig {
    /// Resolve names and paths for a source collection
    pub fn targets(&self, source_collection: &str) -> CollectionTargets {
        let output_collection = self
            .custom_output_collections
            .get(source_collection)
            .cloned()
            .unwrap_or_else(|| {
                format!("search_suggestions_{}", source_collection.replace('-', "_"))
            });

        CollectionTargets {
            source_collection: source_collection.to_string(),
            output_collection,
            output_file: self
                .output_dir
                .join(format!("suggestions-output-{}.json", source_collection)),
        }
    }
}

/// Where a run reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionTargets {
    pub source_collection: String,
    pub output_collection: String,
    pub output_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerationConfig {
    /// Documents sampled per value when intersecting identifier arrays
    #[validate(range(min = 1, max = 250))]
    #[serde(default = "default_sample_size")]
    pub sample_size: u32,

    /// Groups per page while harvesting display names
    #[validate(range(min = 1, max = 250))]
    #[serde(default = "default_display_name_page_size")]
    pub display_name_page_size: u32,

    /// Upper bound on display name pages
    #[validate(range(min = 1))]
    #[serde(default = "default_max_display_name_pages")]
    pub max_display_name_pages: u32,

    /// Facet values returned per field by the extraction query
    #[validate(range(min = 1))]
    #[serde(default = "default_max_facet_values")]
    pub max_facet_values: u32,

    /// Documents per import call
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            display_name_page_size: default_display_name_page_size(),
            max_display_name_pages: default_max_display_name_pages(),
            max_facet_values: default_max_facet_values(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

// Default value functions
fn default_source_collection() -> String {
    "consumer-products".to_string()
}

fn default_custom_outputs() -> HashMap<String, String> {
    HashMap::from([(
        "store-products".to_string(),
        "store_search_suggestions".to_string(),
    )])
}

fn default_overrides_path() -> PathBuf {
    PathBuf::from("config/manual_overrides.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_sample_size() -> u32 {
    10
}

fn default_display_name_page_size() -> u32 {
    250
}

fn default_max_display_name_pages() -> u32 {
    1000
}

fn default_max_facet_values() -> u32 {
    999
}

fn default_batch_size() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_source_collection(), "consumer-products");
        assert_eq!(default_sample_size(), 10);
        assert_eq!(default_batch_size(), 100);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn test_output_collection_naming() {
        let collections = CollectionsConfig::default();

        let targets = collections.targets("consumer-products");
        assert_eq!(targets.output_collection, "search_suggestions_consumer_products");
        assert_eq!(
            targets.output_file,
            PathBuf::from("./suggestions-output-consumer-products.json")
        );

        let targets = collections.targets("store-products");
        assert_eq!(targets.output_collection, "store_search_suggestions");
    }

    #[test]
    fn test_generation_validation() {
        assert!(GenerationConfig::default().validate().is_ok());

        let config = GenerationConfig {
            batch_size: 250,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GenerationConfig {
            sample_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_a_configuration_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            "[typesense]\nhost = \"search.prod.internal\"\nport = \"not-a-port\"\n",
        )
        .unwrap();

        let err = Config::load_from(path.to_str().unwrap()).unwrap_err();
        let app: crate::error::AppError = err.into();
        assert_eq!(app.error_code(), "CONFIGURATION_ERROR");
        assert_eq!(app.exit_code(), 2);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        let err = Config::load_from(path.to_str().unwrap()).unwrap_err();
        assert_eq!(crate::error::AppError::from(err).exit_code(), 2);
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[generation]\nsample_size = 25\n").unwrap();

        let config = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.generation.sample_size, 25);
        assert_eq!(config.generation.batch_size, 100);
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.typesense.port, 8108);
        assert_eq!(config.collections.default_source, "consumer-products");
        assert_eq!(config.generation.batch_size, 100);
    }
}
