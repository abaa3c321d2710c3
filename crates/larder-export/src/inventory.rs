//! Identity resolution against an existing Shopify product export.
//!
//! Matching is exact only: barcode, then SKU, then case-insensitive title.
//! A hit gives the product its Shopify ID and handle so the next import
//! updates the listing instead of creating a duplicate.

use std::collections::{BTreeMap, HashMap};

use larder_core::Product;
use larder_ingest::clean_barcode;
use larder_ingest::decode::decode_text;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// One listing from a Matrixify `products_export.csv`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Handle", default)]
    pub handle: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Variant Barcode", default)]
    pub barcode: String,
    #[serde(rename = "Variant SKU", default)]
    pub sku: String,
    #[serde(rename = "Vendor", default)]
    pub vendor: String,
    #[serde(rename = "Type", default)]
    pub product_type: String,
    #[serde(rename = "Body (HTML)", default)]
    pub body_html: String,
}

/// Which identifier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Barcode,
    Sku,
    Handle,
    Title,
}

/// Per-identifier match counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub by_barcode: usize,
    pub by_sku: usize,
    pub by_title: usize,
    pub unmatched: usize,
}

impl MatchSummary {
    #[must_use]
    pub fn matched(&self) -> usize {
        self.by_barcode + self.by_sku + self.by_title
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total_products: usize,
    pub with_barcode: usize,
    pub with_sku: usize,
    /// Listing count per vendor.
    pub vendors: BTreeMap<String, usize>,
    /// Listing count per product type.
    pub product_types: BTreeMap<String, usize>,
}

impl InventoryStats {
    #[must_use]
    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    #[must_use]
    pub fn type_count(&self) -> usize {
        self.product_types.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapEntry {
    pub handle: String,
    pub title: String,
}

/// Listings missing data the storefront relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataGaps {
    pub total: usize,
    pub missing_barcode: Vec<GapEntry>,
    pub missing_description: Vec<GapEntry>,
    pub missing_vendor: Vec<GapEntry>,
}

/// Loaded inventory with lookup indexes. The first listing wins when an
/// identifier repeats.
#[derive(Debug, Default)]
pub struct Inventory {
    items: Vec<InventoryItem>,
    by_barcode: HashMap<String, usize>,
    by_sku: HashMap<String, usize>,
    by_handle: HashMap<String, usize>,
    by_title: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
}

fn index_key(index: &mut HashMap<String, usize>, key: String, position: usize) {
    if key.is_empty() {
        return;
    }
    if let Some(first) = index.get(&key) {
        tracing::debug!(key = %key, first, duplicate = position, "duplicate inventory key");
        return;
    }
    index.insert(key, position);
}

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

impl Inventory {
    /// Build the indexes. Barcodes go through the same normalisation as
    /// ingested rows so spreadsheet-mangled values still match.
    #[must_use]
    pub fn from_items(items: Vec<InventoryItem>) -> Self {
        let mut inventory = Inventory::default();
        for (position, item) in items.iter().enumerate() {
            index_key(&mut inventory.by_barcode, clean_barcode(&item.barcode), position);
            index_key(&mut inventory.by_sku, item.sku.trim().to_owned(), position);
            index_key(&mut inventory.by_handle, item.handle.trim().to_lowercase(), position);
            index_key(&mut inventory.by_title, normalize_title(&item.title), position);
            index_key(&mut inventory.by_id, item.id.trim().to_owned(), position);
        }
        inventory.items = items;
        tracing::info!(
            listings = inventory.items.len(),
            barcodes = inventory.by_barcode.len(),
            skus = inventory.by_sku.len(),
            handles = inventory.by_handle.len(),
            "indexed inventory"
        );
        inventory
    }

    #[must_use]
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn lookup(&self, index: &HashMap<String, usize>, key: &str) -> Option<&InventoryItem> {
        index.get(key).and_then(|&i| self.items.get(i))
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&InventoryItem> {
        self.lookup(&self.by_id, id.trim())
    }

    /// Resolve a free-form identifier: barcode, SKU, handle, then title.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<(&InventoryItem, MatchKind)> {
        let raw = identifier.trim();
        if raw.is_empty() {
            return None;
        }
        let barcode = clean_barcode(raw);
        self.lookup(&self.by_barcode, &barcode)
            .map(|item| (item, MatchKind::Barcode))
            .or_else(|| self.lookup(&self.by_sku, raw).map(|item| (item, MatchKind::Sku)))
            .or_else(|| {
                self.lookup(&self.by_handle, &raw.to_lowercase())
                    .map(|item| (item, MatchKind::Handle))
            })
            .or_else(|| {
                self.lookup(&self.by_title, &normalize_title(raw))
                    .map(|item| (item, MatchKind::Title))
            })
    }

    /// Match one product: barcode, then SKU, then exact title.
    #[must_use]
    pub fn match_product(&self, product: &Product) -> Option<(&InventoryItem, MatchKind)> {
        let barcode = clean_barcode(&product.barcode);
        let sku = product.sku.trim();
        let title = normalize_title(&product.name);

        (!barcode.is_empty())
            .then(|| self.lookup(&self.by_barcode, &barcode))
            .flatten()
            .map(|item| (item, MatchKind::Barcode))
            .or_else(|| {
                (!sku.is_empty())
                    .then(|| self.lookup(&self.by_sku, sku))
                    .flatten()
                    .map(|item| (item, MatchKind::Sku))
            })
            .or_else(|| {
                (!title.is_empty())
                    .then(|| self.lookup(&self.by_title, &title))
                    .flatten()
                    .map(|item| (item, MatchKind::Title))
            })
    }

    #[must_use]
    pub fn stats(&self) -> InventoryStats {
        let mut stats = InventoryStats {
            total_products: self.items.len(),
            ..InventoryStats::default()
        };
        for item in &self.items {
            if !item.barcode.trim().is_empty() {
                stats.with_barcode += 1;
            }
            if !item.sku.trim().is_empty() {
                stats.with_sku += 1;
            }
            let vendor = item.vendor.trim();
            if !vendor.is_empty() {
                *stats.vendors.entry(vendor.to_owned()).or_default() += 1;
            }
            let product_type = item.product_type.trim();
            if !product_type.is_empty() {
                *stats.product_types.entry(product_type.to_owned()).or_default() += 1;
            }
        }
        stats
    }

    #[must_use]
    pub fn gaps(&self) -> DataGaps {
        let mut gaps = DataGaps {
            total: self.items.len(),
            ..DataGaps::default()
        };
        for item in &self.items {
            let entry = || GapEntry {
                handle: item.handle.clone(),
                title: item.title.clone(),
            };
            if item.barcode.trim().is_empty() {
                gaps.missing_barcode.push(entry());
            }
            if item.body_html.trim().is_empty() {
                gaps.missing_description.push(entry());
            }
            if item.vendor.trim().is_empty() {
                gaps.missing_vendor.push(entry());
            }
        }
        gaps
    }
}

/// Parse a Matrixify product export.
///
/// # Errors
///
/// - [`ExportError::MissingInventoryColumn`] when there is no `Handle` or
///   `Title` column.
/// - [`ExportError::Csv`] for unreadable records.
pub fn load_inventory(bytes: &[u8]) -> Result<Inventory, ExportError> {
    let text = decode_text(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    for column in ["Handle", "Title"] {
        if !headers.iter().any(|h| h == column) {
            return Err(ExportError::MissingInventoryColumn { column });
        }
    }

    let mut items = Vec::new();
    for record in reader.deserialize::<InventoryItem>() {
        items.push(record?);
    }
    Ok(Inventory::from_items(items))
}

/// Give matched products their Shopify ID and handle. Unmatched products
/// are left untouched and export as new listings.
pub fn match_products(products: &mut [Product], inventory: &Inventory) -> MatchSummary {
    let mut summary = MatchSummary::default();
    for product in products.iter_mut() {
        let Some((item, kind)) = inventory.match_product(product) else {
            summary.unmatched += 1;
            continue;
        };
        match kind {
            MatchKind::Barcode => summary.by_barcode += 1,
            MatchKind::Sku => summary.by_sku += 1,
            MatchKind::Title | MatchKind::Handle => summary.by_title += 1,
        }
        tracing::debug!(
            sku = %product.sku,
            handle = %item.handle,
            matched_by = ?kind,
            "matched inventory listing"
        );
        product.shopify_id.clone_from(&item.id);
        product.shopify_handle.clone_from(&item.handle);
    }
    tracing::info!(
        matched = summary.matched(),
        total = products.len(),
        "matched products to inventory"
    );
    summary
}

#[cfg(test)]
#[path = "inventory_test.rs"]
mod tests;
