//! The `inventory` command: statistics and data gaps for a Shopify export.

use std::path::Path;

use anyhow::Context;
use larder_core::AppConfig;
use larder_export::inventory::GapEntry;
use larder_export::load_inventory;

fn print_gaps(label: &str, entries: &[GapEntry], limit: usize) {
    println!("{label}: {}", entries.len());
    for entry in entries.iter().take(limit) {
        println!("  {:<40} {}", entry.handle, entry.title);
    }
    if entries.len() > limit {
        println!("  ... and {} more", entries.len() - limit);
    }
}

/// Print inventory statistics followed by the gap lists.
///
/// # Errors
///
/// Returns an error if no file is given or configured, or if it cannot be
/// read as a product export.
pub(crate) fn run_inventory(
    config: &AppConfig,
    file: Option<&Path>,
    limit: usize,
) -> anyhow::Result<()> {
    let Some(path) = file.or(config.inventory_path.as_deref()) else {
        anyhow::bail!("no inventory file given; pass a path or set LARDER_INVENTORY_PATH");
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let inventory = load_inventory(&bytes)
        .with_context(|| format!("failed to load inventory {}", path.display()))?;

    let stats = inventory.stats();
    println!("listings:      {}", stats.total_products);
    println!("with barcode:  {}", stats.with_barcode);
    println!("with SKU:      {}", stats.with_sku);
    println!("vendors:       {}", stats.vendor_count());
    for (vendor, count) in &stats.vendors {
        println!("  {vendor:<38} {count}");
    }
    println!("product types: {}", stats.type_count());
    for (product_type, count) in &stats.product_types {
        println!("  {product_type:<38} {count}");
    }
    println!();

    let gaps = inventory.gaps();
    print_gaps("missing barcode", &gaps.missing_barcode, limit);
    print_gaps("missing description", &gaps.missing_description, limit);
    print_gaps("missing vendor", &gaps.missing_vendor, limit);
    Ok(())
}
