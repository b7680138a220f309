use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rental_listings::{ListingStore, StoreConfig, DEFAULT_EXPORT_FILE};
use tracing_subscriber::EnvFilter;

/// Inspect, back up and restore the locally published listings.
#[derive(Parser)]
#[command(name = "listings", version)]
struct Cli {
    /// Directory holding the store (overrides LISTINGS_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Storage key (overrides LISTINGS_STORAGE_KEY)
    #[arg(long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print stored listings
    List {
        /// Only listings visible in the public catalog
        #[arg(long)]
        public: bool,
    },
    /// Write a JSON backup of every listing
    Export {
        /// Output file
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        out: PathBuf,
        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Merge listings from a JSON backup
    Import { file: PathBuf },
    /// Delete every stored listing
    Clear,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = StoreConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(key) = cli.key {
        config.storage_key = key;
    }

    let store = ListingStore::open(&config)
        .with_context(|| format!("failed to open store in {}", config.data_dir.display()))?;

    match cli.command {
        Command::List { public } => {
            let listings = if public {
                store.public_listings()
            } else {
                store.load()
            };
            for listing in &listings {
                println!(
                    "{}  {}  {}/day  {}  {}",
                    listing.id,
                    listing.title,
                    listing.price_per_day,
                    listing.condition,
                    listing.visibility
                );
            }
            tracing::info!(count = listings.len(), "listed");
        }
        Command::Export { out, stdout } => {
            if stdout {
                println!("{}", store.export_listings()?);
            } else {
                let count = store.export_to_path(&out)?;
                println!("Exported {} listings to {}", count, out.display());
            }
        }
        Command::Import { file } => {
            let total = store
                .import_from_path(&file)
                .with_context(|| format!("invalid file {}", file.display()))?;
            println!("Total listings on this device: {}", total);
        }
        Command::Clear => {
            store.clear()?;
            println!("Local listings deleted");
        }
    }

    Ok(())
}
