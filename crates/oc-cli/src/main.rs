//! Ops Console table inspector
//!
//! Resolves table views the way the console does: from a preset or a schema
//! file, a query string, and the configured table defaults.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oc_core::config::ConsoleConfig;
use oc_tables::{presets, FilterSchema, MemoryLocation, TableView, TableViewBuilder};

mod fetcher;

use fetcher::JsonFileFetcher;

/// Inspect Ops Console table views
#[derive(Parser)]
#[command(name = "oc-console")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level regardless of OC_LOG / RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the resources that have a preset table
    Resources,

    /// Print the filter schema and columns of a table
    Schema(TableArgs),

    /// Mount a table view on a query string and print its state
    Resolve(ResolveArgs),

    /// Load a page from a JSON file and print the partition summaries
    Summarize(SummarizeArgs),
}

#[derive(Args, Debug, Clone)]
struct TableArgs {
    /// Table resource, e.g. process-instances
    resource: String,

    /// JSON filter schema replacing the preset one
    #[arg(long)]
    schema_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct ResolveArgs {
    #[command(flatten)]
    table: TableArgs,

    /// Query string the view is mounted with
    #[arg(short, long, default_value = "")]
    query: String,

    /// Page to request (0-based)
    #[arg(long, default_value_t = 0)]
    page: u32,

    /// Page size, defaults to OC_DEFAULT_PAGE_SIZE
    #[arg(long)]
    page_size: Option<u32>,
}

#[derive(Args, Debug, Clone)]
struct SummarizeArgs {
    #[command(flatten)]
    resolve: ResolveArgs,

    /// JSON file with a partitioned page or a list of rows
    #[arg(long)]
    page_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let loaded = ConsoleConfig::from_env();

    let filter = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.filter.clone(),
        (Err(_), false) => ConsoleConfig::default().logging.filter,
    };
    init_tracing(&filter);

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        ConsoleConfig::default()
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        engine = %config.engine.base_url,
        "Starting Ops Console inspector"
    );

    let output = match cli.command {
        Commands::Resources => json!(presets::RESOURCES),
        Commands::Schema(args) => schema_report(&args, &config)?,
        Commands::Resolve(args) => {
            let (view, location) = resolve_view(&args, &config)?;
            resolve_report(&view, &location)
        }
        Commands::Summarize(args) => summarize(&args, &config).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Initialize tracing/logging on stderr, leaving stdout for reports
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();
}

fn table_builder(args: &TableArgs, config: &ConsoleConfig) -> Result<TableViewBuilder> {
    let builder = match (presets::by_resource(&args.resource), &args.schema_file) {
        (Some(builder), _) => builder,
        (None, Some(_)) => TableViewBuilder::new(args.resource.as_str()),
        (None, None) => anyhow::bail!(
            "unknown resource '{}', expected one of: {}",
            args.resource,
            presets::RESOURCES.join(", ")
        ),
    };
    let mut builder = builder.with_defaults(&config.tables);

    if let Some(path) = &args.schema_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading schema file {}", path.display()))?;
        builder = builder.schema(FilterSchema::from_json(&raw)?);
    }

    Ok(builder)
}

fn schema_report(args: &TableArgs, config: &ConsoleConfig) -> Result<Value> {
    let view: TableView<Value> = table_builder(args, config)?.build()?;
    Ok(json!({
        "resource": view.resource(),
        "filters": view.schema(),
        "columns": view.state().columns(),
        "defaultSort": view.state().sort(),
        "pageSize": view.state().page_size(),
    }))
}

fn resolve_view(
    args: &ResolveArgs,
    config: &ConsoleConfig,
) -> Result<(TableView<Value>, Arc<MemoryLocation>)> {
    let location = MemoryLocation::shared(args.query.as_str());
    let mut view: TableView<Value> = table_builder(&args.table, config)?
        .location(location.clone())
        .build()?;

    view.mount();
    if let Some(size) = args.page_size {
        view.set_page_size(size);
    }
    view.set_page(args.page);

    Ok((view, location))
}

fn resolve_report(view: &TableView<Value>, location: &MemoryLocation) -> Value {
    use oc_tables::Location;

    json!({
        "resource": view.resource(),
        "filterValues": view.filter_values(),
        "sort": view.state().sort(),
        "fetchRequest": view.fetch_request(),
        "url": location.search(),
        "canonicalQuery": view.canonical_query(),
    })
}

async fn summarize(args: &SummarizeArgs, config: &ConsoleConfig) -> Result<Value> {
    let (mut view, _location) = resolve_view(&args.resolve, config)?;
    let fetcher = JsonFileFetcher::new(view.resource(), &args.page_file);
    view.load(&fetcher).await?;

    let partitions: Vec<Value> = view
        .summaries()
        .into_iter()
        .map(|(partition, summary)| {
            json!({
                "partition": partition,
                "summary": summary.to_string(),
                "outOfRange": summary.is_error(),
            })
        })
        .collect();

    Ok(json!({
        "resource": view.resource(),
        "fetchRequest": view.fetch_request(),
        "partitions": partitions,
    }))
}
