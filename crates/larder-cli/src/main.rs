mod inspect;
mod inventory;
mod process;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::process::ProcessArgs;

#[derive(Debug, Parser)]
#[command(name = "larder")]
#[command(about = "Grocery product enrichment and Shopify export")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest a supplier CSV, enrich it, write copy, and export it
    Process(ProcessArgs),
    /// Show how a supplier CSV would be read without fetching anything
    Inspect {
        /// Supplier CSV file
        input: PathBuf,

        /// Category applied to rows that carry none
        #[arg(long, default_value = "Groceries")]
        category: String,

        /// Number of parsed products to print
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
    /// Summarise a Shopify product export and list data gaps
    Inventory {
        /// Matrixify `products_export.csv`; defaults to `LARDER_INVENTORY_PATH`
        file: Option<PathBuf>,

        /// Maximum entries printed per gap list
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config =
        larder_core::load_app_config_from_env().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Process(args)) => process::run_process(&config, args).await?,
        Some(Commands::Inspect {
            input,
            category,
            rows,
        }) => inspect::run_inspect(&config, &input, &category, rows)?,
        Some(Commands::Inventory { file, limit }) => {
            inventory::run_inventory(&config, file.as_deref(), limit)?;
        }
        None => println!("larder: run `larder --help` for available commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
