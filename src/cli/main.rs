//! docmodel - store and inspect record documents from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docmodel_sdk::cli::commands::{
    RecordCollection, handle_count, handle_delete, handle_get, handle_insert, handle_list,
    handle_replace, load_input,
};
use docmodel_sdk::cli::output::{format_record, format_record_table};
use docmodel_sdk::{Collection, DocumentFormat, FileSystemStorageBackend, StoreConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docmodel")]
#[command(about = "Store and inspect record documents", long_about = None)]
struct Cli {
    /// TOML store configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store directory (overrides config)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Collection name (overrides config)
    #[arg(long)]
    collection: Option<String>,

    /// Document format: json or yaml (overrides config)
    #[arg(long)]
    format: Option<DocumentFormat>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert a record from a JSON file (`-` for stdin)
    Insert { input: String },

    /// Print a record by id
    Get { id: String },

    /// List all records
    List,

    /// Replace a stored record; the document must include `_id`
    Replace { input: String },

    /// Delete a record by id
    Delete { id: String },

    /// Count stored records
    Count,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(store) = cli.store {
        config.base_path = store;
    }
    if let Some(collection) = cli.collection {
        config.collection = collection;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    let backend = FileSystemStorageBackend::new(&config.base_path);
    let collection: RecordCollection<_> = Collection::new(backend, config.collection.clone())
        .context("Failed to open collection")?
        .with_format(config.format);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(run(cli.command, &collection))
}

async fn run(
    command: Commands,
    collection: &RecordCollection<FileSystemStorageBackend>,
) -> Result<()> {
    match command {
        Commands::Insert { input } => {
            let content = load_input(&input)?;
            let id = handle_insert(collection, &content).await?;
            println!("{}", id);
        }
        Commands::Get { id } => {
            let record = handle_get(collection, &id).await?;
            println!("{}", format_record(&record));
        }
        Commands::List => {
            let records = handle_list(collection).await?;
            print!("{}", format_record_table(&records));
        }
        Commands::Replace { input } => {
            let content = load_input(&input)?;
            let id = handle_replace(collection, &content).await?;
            println!("Replaced {}", id);
        }
        Commands::Delete { id } => {
            handle_delete(collection, &id).await?;
            println!("Deleted {}", id);
        }
        Commands::Count => {
            println!("{}", handle_count(collection).await?);
        }
    }

    Ok(())
}
