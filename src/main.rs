use clap::{Parser, Subcommand};
use std::path::PathBuf;
use suggestion_harvester::{
    config::{CollectionTargets, Config},
    search::{SearchBackend, TypesenseClient},
    suggestions::{
        load_overrides, read_output, run_generation, run_sync, sample_document,
        AttributeExtractor, MappingResolver, Synchronizer,
    },
    telemetry::init_tracing,
    AppError,
};
use validator::Validate;

#[derive(Parser)]
#[command(name = "suggestion-harvester", version)]
#[command(about = "Generate and publish autocomplete suggestions from a Typesense catalog", long_about = None)]
struct Cli {
    /// Source collection to mine
    #[arg(short, long, global = true, env = "SUGGEST_COLLECTION")]
    collection: Option<String>,

    /// Configuration file layered over the built-in defaults
    #[arg(long, global = true, env = "CONFIG_PATH")]
    config: Option<String>,

    /// Output collection (defaults to the naming convention)
    #[arg(short, long, global = true)]
    output_collection: Option<String>,

    /// Review file path
    #[arg(short = 'f', long, global = true)]
    output_file: Option<PathBuf>,

    /// Manual overrides file
    #[arg(long, global = true)]
    overrides: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate suggestions and write the review file
    Generate,

    /// Generate, write the review file and upload to the output collection
    Sync,

    /// Upload a reviewed file as-is to the output collection
    Publish,

    /// Print one sample document from the source collection
    Inspect,

    /// Print the resolved attribute identifiers
    Resolve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            let e = AppError::from(e);
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    init_tracing(&config.observability);

    if let Err(e) = run(cli, config).await {
        tracing::error!(error_code = e.error_code(), "{}", e);
        eprintln!("\n=== Error in Suggestion Service ===\n{}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, config: Config) -> Result<(), AppError> {
    config.generation.validate()?;

    let source = cli
        .collection
        .clone()
        .unwrap_or_else(|| config.collections.default_source.clone());
    let targets = resolve_targets(&cli, &config, &source);

    tracing::info!(
        "Starting Suggestion Service v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        source = %targets.source_collection,
        output = %targets.output_collection,
        file = %targets.output_file.display(),
        "Collections"
    );

    let client = TypesenseClient::new(&config.typesense)?;
    let backend: &dyn SearchBackend = &client;

    let overrides_path = cli
        .overrides
        .clone()
        .unwrap_or_else(|| config.collections.overrides_path.clone());

    match cli.command {
        Commands::Generate => {
            let overrides = load_overrides(&overrides_path)?;
            let outcome = run_generation(backend, &config.generation, &targets, &overrides).await?;
            tracing::info!(written = outcome.written, "Suggestions generated successfully");
            println!("Review suggestions in: {}", targets.output_file.display());
        }
        Commands::Sync => {
            let overrides = load_overrides(&overrides_path)?;
            let report = run_sync(backend, &config.generation, &targets, &overrides).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Publish => {
            let reviewed = read_output(&targets.output_file)?;
            let report = Synchronizer::new(backend, config.generation.batch_size)
                .sync(&reviewed, &[], &targets.output_collection)
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Inspect => {
            match sample_document(backend, &targets.source_collection).await? {
                Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
                None => println!("No documents found"),
            }
        }
        Commands::Resolve => {
            let attributes = AttributeExtractor::new(backend, config.generation.max_facet_values)
                .extract(&targets.source_collection)
                .await?;
            let mapping = MappingResolver::new(backend, config.generation.sample_size)
                .resolve(&attributes, &targets.source_collection)
                .await;
            println!("{}", serde_json::to_string_pretty(&mapping)?);
        }
    }

    Ok(())
}

fn resolve_targets(cli: &Cli, config: &Config, source: &str) -> CollectionTargets {
    let mut targets = config.collections.targets(source);
    if let Some(output) = &cli.output_collection {
        targets.output_collection = output.clone();
    }
    if let Some(file) = &cli.output_file {
        targets.output_file = file.clone();
    }
    targets
}
