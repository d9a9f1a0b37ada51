use anyhow::{Context, Result};
use clap::Parser;
use schema_context::{Config, SchemaContext, SchemaSelector, SemanticResults};
use std::collections::HashSet;
use std::path::PathBuf;

/// Select schema context for a query from precomputed semantic search hits.
#[derive(Parser, Debug)]
#[command(name = "schema-context", version)]
struct Args {
    /// Natural-language query.
    query: String,

    /// Config file (default: $SCHEMA_CONTEXT_CONFIG or ./config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search results JSON: {"tables": [...], "columns": [...]}.
    #[arg(long)]
    hits: PathBuf,

    /// Restrict selection to these tables (repeatable).
    #[arg(long = "available")]
    available: Vec<String>,

    /// Override selection.max_tables_per_query.
    #[arg(long)]
    max_tables: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.query.trim().is_empty() {
        anyhow::bail!("Query cannot be empty");
    }

    let config = match &args.config {
        Some(path) => {
            let _ = dotenv::dotenv();
            Config::from_path(path)?
        }
        None => Config::load()?,
    };

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.logging.log_level.as_str()),
    )
    .init();

    let selector = SchemaSelector::from_config(&config)?;

    let results = SemanticResults::from_file(&args.hits)
        .with_context(|| format!("Failed to load search results: {}", args.hits.display()))?;
    log::info!(
        "Loaded {} table hits and {} column hits",
        results.tables.len(),
        results.columns.len()
    );

    let available: Option<HashSet<String>> = if args.available.is_empty() {
        None
    } else {
        Some(args.available.iter().cloned().collect())
    };

    let max_tables = args
        .max_tables
        .unwrap_or(config.selection.max_tables_per_query);
    let tables = selector.select_tables(&args.query, &results, available.as_ref(), max_tables);
    if tables.is_empty() {
        log::warn!("No relevant schema found for query: {}", args.query);
    }
    let columns = selector.select_columns(&args.query, &results, &tables.selected_tables);

    let context = SchemaContext { tables, columns };
    println!("{}", serde_json::to_string_pretty(&context)?);

    Ok(())
}
