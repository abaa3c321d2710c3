//! The `process` command: ingest, enrich, describe, match, export.
//!
//! Only an unreadable input, a file with no usable rows, or bad
//! configuration stops the run. Per-product source and copy failures are
//! recorded on the product and the batch carries on.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use larder_copy::{CopyWriter, OpenAiClient};
use larder_core::{AppConfig, Product, SourcesFile};
use larder_enrich::facts::apply_facts;
use larder_enrich::{Enricher, HostLimiter, HttpFetcher, OpenFoodFactsClient};
use larder_export::{
    load_inventory, match_products, write_business_central_csv, write_excel, write_shopify_csv,
};
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ExportFormat {
    Shopify,
    BusinessCentral,
    Excel,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Supplier CSV file
    pub input: PathBuf,

    /// Category applied to rows that carry none
    #[arg(long, default_value = "Groceries")]
    pub category: String,

    /// Directory for the export files
    #[arg(long, short, default_value = "output")]
    pub output_dir: PathBuf,

    /// Export formats to write (repeatable)
    #[arg(
        long = "format",
        value_enum,
        default_values = ["shopify", "business-central", "excel"]
    )]
    pub formats: Vec<ExportFormat>,

    /// Skip Open Food Facts and website lookups
    #[arg(long)]
    pub no_enrich: bool,

    /// Skip description generation
    #[arg(long)]
    pub no_copy: bool,

    /// Matrixify product export to match against; defaults to `LARDER_INVENTORY_PATH`
    #[arg(long)]
    pub inventory: Option<PathBuf>,
}

/// Load `sources.yaml`, or run with no configured sites when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed or validated.
pub(crate) fn load_sources_or_default(path: &Path) -> anyhow::Result<SourcesFile> {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "sources file not found; only Open Food Facts will be queried"
        );
        return Ok(SourcesFile::default());
    }
    larder_core::load_sources(path)
        .with_context(|| format!("failed to load sources from {}", path.display()))
}

fn output_path(dir: &Path, stem: &str, suffix: &str, stamp: &str, ext: &str) -> PathBuf {
    dir.join(format!("{stem}_{suffix}_{stamp}.{ext}"))
}

async fn enrich(
    config: &AppConfig,
    sources: SourcesFile,
    products: Vec<Product>,
) -> anyhow::Result<Vec<Product>> {
    let limiter = Arc::new(HostLimiter::new(Duration::from_millis(
        config.inter_request_delay_ms,
    )));
    let barcode_lookup = OpenFoodFactsClient::new(
        &config.off_base_url,
        config.off_timeout_secs,
        &config.user_agent,
        Arc::clone(&limiter),
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .context("failed to build Open Food Facts client")?;
    let fetcher = HttpFetcher::new(
        config.scrape_timeout_secs,
        &config.user_agent,
        limiter,
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .context("failed to build page fetcher")?;

    let enricher = Enricher::new(barcode_lookup, fetcher, sources)
        .with_max_concurrent(config.max_concurrent_products);
    Ok(enricher.enrich_batch(products).await)
}

async fn describe(config: &AppConfig, products: Vec<Product>) -> anyhow::Result<Vec<Product>> {
    let Some(api_key) = config.openai_api_key.as_deref() else {
        tracing::warn!("OPENAI_API_KEY is not set; skipping description generation");
        return Ok(products);
    };
    let client = OpenAiClient::new(
        api_key,
        &config.openai_base_url,
        &config.openai_model,
        config.openai_timeout_secs,
    )
    .context("failed to build OpenAI client")?;
    let writer = CopyWriter::new(client, config.generation_max_attempts)
        .with_backoff_base(Duration::from_secs(config.retry_backoff_base_secs))
        .with_min_interval(Duration::from_millis(config.inter_request_delay_ms));
    Ok(writer.describe_batch(products).await)
}

/// Run the full pipeline for one supplier file.
///
/// # Errors
///
/// Returns an error if the input, sources, or inventory cannot be read, if
/// no row yields a product, or if an export file cannot be written.
pub(crate) async fn run_process(config: &AppConfig, args: ProcessArgs) -> anyhow::Result<()> {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("process", %run_id, input = %args.input.display());
    run_pipeline(config, args).instrument(span).await
}

async fn run_pipeline(config: &AppConfig, args: ProcessArgs) -> anyhow::Result<()> {
    let started = chrono::Utc::now();
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let sources = load_sources_or_default(&config.sources_path)?;

    let report = larder_ingest::parse_csv(&bytes, &args.category, &sources.headerless_layout)
        .with_context(|| format!("no products could be read from {}", args.input.display()))?;
    for skipped in &report.skipped {
        eprintln!("warning: skipped row {}: {}", skipped.row, skipped.reason);
    }
    println!(
        "read {} products ({:?} layout, {} rows skipped)",
        report.products.len(),
        report.schema,
        report.skipped.len()
    );

    let mut products = if args.no_enrich {
        let mut products = report.products;
        products.iter_mut().for_each(apply_facts);
        products
    } else {
        enrich(config, sources, report.products).await?
    };

    if !args.no_copy {
        products = describe(config, products).await?;
    }

    let inventory_path = args.inventory.as_ref().or(config.inventory_path.as_ref());
    if let Some(path) = inventory_path {
        let inventory_bytes = std::fs::read(path)
            .with_context(|| format!("failed to read inventory {}", path.display()))?;
        let inventory = load_inventory(&inventory_bytes)
            .with_context(|| format!("failed to load inventory {}", path.display()))?;
        let summary = match_products(&mut products, &inventory);
        println!(
            "inventory: {} matched (barcode {}, sku {}, title {}), {} new",
            summary.matched(),
            summary.by_barcode,
            summary.by_sku,
            summary.by_title,
            summary.unmatched
        );
    }

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;
    let stem = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("products");
    let stamp = started.format("%Y%m%d_%H%M%S").to_string();

    let mut formats = args.formats.clone();
    formats.sort_unstable();
    formats.dedup();
    for format in formats {
        let (path, bytes) = match format {
            ExportFormat::Shopify => (
                output_path(&args.output_dir, stem, "shopify", &stamp, "csv"),
                write_shopify_csv(&products, &config.store_vendor)?,
            ),
            ExportFormat::BusinessCentral => (
                output_path(&args.output_dir, stem, "business_central", &stamp, "csv"),
                write_business_central_csv(&products)?,
            ),
            ExportFormat::Excel => (
                output_path(&args.output_dir, stem, "review", &stamp, "xlsx"),
                write_excel(&products)?,
            ),
        };
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {}", path.display());
    }

    let enrichment_failures = products.iter().filter(|p| p.enrichment_error.is_some()).count();
    let copy_failures = products.iter().filter(|p| p.generation_error.is_some()).count();
    let elapsed = chrono::Utc::now() - started;
    tracing::info!(
        products = products.len(),
        enrichment_failures,
        copy_failures,
        elapsed_secs = elapsed.num_seconds(),
        "run complete"
    );
    println!(
        "done: {} products, {} with enrichment errors, {} with copy errors",
        products.len(),
        enrichment_failures,
        copy_failures
    );
    Ok(())
}
