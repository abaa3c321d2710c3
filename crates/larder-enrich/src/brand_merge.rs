//! Attach separately scraped brand-site records to products.
//!
//! This is a convenience for bulk brand scrapes. It fills empty fields
//! only and never touches identity (SKU, barcode, Shopify IDs).

use std::collections::BTreeSet;

use larder_core::{DataSource, Product};
use larder_facts::badges_from_text;

use crate::extract::ScrapedPage;
use crate::facts::allergens_from_text;

/// Share of a product's significant words that must appear in a record
/// name for a fuzzy match.
const MIN_WORD_OVERLAP: f64 = 0.6;

const STOP_WORDS: [&str; 8] = ["the", "and", "with", "for", "from", "in", "of", "a"];

/// One record from a bulk brand-site scrape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandRecord {
    pub name: String,
    pub barcode: String,
    pub page: ScrapedPage,
}

fn significant_words(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 1 && !STOP_WORDS.contains(w))
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn word_overlap(product: &BTreeSet<String>, record: &BTreeSet<String>) -> f64 {
    if product.is_empty() {
        return 0.0;
    }
    product.intersection(record).count() as f64 / product.len() as f64
}

fn best_match<'a>(product: &Product, records: &'a [BrandRecord]) -> Option<&'a BrandRecord> {
    if !product.barcode.is_empty() {
        if let Some(record) = records.iter().find(|r| r.barcode == product.barcode) {
            return Some(record);
        }
    }
    let wanted = significant_words(&product.name);
    records
        .iter()
        .map(|r| (r, word_overlap(&wanted, &significant_words(&r.name))))
        .filter(|(_, score)| *score >= MIN_WORD_OVERLAP)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(r, _)| r)
}

/// Fill empty product fields from the best-matching brand record: same
/// barcode first, else the highest word overlap of at least 60%.
///
/// Returns how many products received a record.
pub fn merge_brand_data(products: &mut [Product], records: &[BrandRecord]) -> usize {
    let mut matched = 0;
    for product in products.iter_mut() {
        let Some(record) = best_match(product, records) else {
            continue;
        };
        matched += 1;
        let page = &record.page;
        let source = DataSource::BrandWebsite;
        product.fill_ingredients(&page.ingredients, source.clone());
        product.fill_nutrition(page.nutrition.clone(), source.clone());
        product.fill_description(&page.description, source.clone());
        product.fill_dietary_badges(badges_from_text(&page.dietary_badges), source.clone());
        product.fill_allergens(allergens_from_text(&page.allergen_text), source);
        tracing::debug!(product = %product.name, record = %record.name, "merged brand record");
    }
    tracing::info!(matched, total = products.len(), "merged brand data");
    matched
}
