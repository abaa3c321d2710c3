//! Per-product enrichment cascade.
//!
//! Stages run in a fixed order and each one only fills fields that are
//! still empty, so an earlier, more trusted source is never overwritten:
//!
//! 1. nutrition carried by the CSV row (already on the draft)
//! 2. Open Food Facts by barcode
//! 3. the brand's own website
//! 4. supplier sites, then fallback search sites, merged by source tier
//! 5. derived facts: ingredient list, dietary tags, allergens, display lines

use futures::stream::{self, StreamExt};
use larder_core::{DataSource, Product, SourcesFile};
use larder_facts::badges_from_text;
use tracing::Instrument;

use crate::facts::{allergens_from_text, apply_facts};
use crate::fetch::PageFetcher;
use crate::lookup::Lookup;
use crate::merge::{merge_scraped, MergedScrape};
use crate::openfoodfacts::BarcodeLookup;
use crate::scrape::{scrape_brand_site, sweep_sources};

/// Runs the enrichment cascade over products with injected collaborators.
pub struct Enricher<B, F> {
    barcode_lookup: B,
    fetcher: F,
    sources: SourcesFile,
    max_concurrent: usize,
}

/// Stages 3 and 4 only run while one of the core facts is missing.
fn needs_facts(product: &Product) -> bool {
    product.nutrition.is_empty() || product.ingredients.is_empty()
}

fn apply_merged(product: &mut Product, merged: MergedScrape) {
    if let Some(s) = merged.ingredients {
        product.fill_ingredients(&s.value, s.source);
    }
    if let Some(s) = merged.nutrition {
        product.fill_nutrition(s.value, s.source);
    }
    if let Some(s) = merged.description {
        product.fill_description(&s.value, s.source);
    }
    if let Some(s) = merged.dietary_badges {
        product.fill_dietary_badges(badges_from_text(&s.value), s.source);
    }
    if let Some(s) = merged.allergen_text {
        product.fill_allergens(allergens_from_text(&s.value), s.source);
    }
}

impl<B: BarcodeLookup, F: PageFetcher> Enricher<B, F> {
    #[must_use]
    pub fn new(barcode_lookup: B, fetcher: F, sources: SourcesFile) -> Self {
        Self {
            barcode_lookup,
            fetcher,
            sources,
            max_concurrent: 1,
        }
    }

    /// Allow up to `max_concurrent` products in flight. Per-host spacing
    /// still applies through the shared limiter inside the clients.
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Enrich one product. Source failures are recorded on
    /// `enrichment_error`; they never abort the cascade.
    pub async fn enrich(&self, mut product: Product) -> Product {
        let mut failures: Vec<String> = Vec::new();

        if product.nutrition_source() == Some(&DataSource::Csv) {
            tracing::debug!(sku = %product.sku, "CSV nutrition is authoritative");
        }

        if product.nutrition.is_empty() && !product.barcode.is_empty() {
            match self.barcode_lookup.lookup(&product.barcode).await {
                Lookup::Found { value, source } => {
                    product.fill_nutrition(value.nutrition, source.clone());
                    product.fill_ingredients(&value.ingredients, source.clone());
                    product.fill_allergens(value.allergens, source);
                }
                Lookup::NotFound => {}
                Lookup::Failed(reason) => failures.push(format!("openfoodfacts: {reason}")),
            }
        }

        if needs_facts(&product) {
            if let Some(site) = self.sources.brand_site(&product.brand) {
                let lookup =
                    scrape_brand_site(&self.fetcher, site, &product.name, &product.barcode).await;
                match lookup {
                    Lookup::Found { value, source } => {
                        product.fill_nutrition(value.nutrition, source.clone());
                        product.fill_ingredients(&value.ingredients, source.clone());
                        product.fill_allergens(allergens_from_text(&value.allergen_text), source);
                    }
                    Lookup::NotFound => {}
                    Lookup::Failed(reason) => failures.push(format!("{}: {reason}", site.name)),
                }
            }
        }

        if needs_facts(&product) {
            let outcome = sweep_sources(
                &self.fetcher,
                &self.sources.suppliers,
                &self.sources.fallbacks,
                &product.name,
                &product.barcode,
            )
            .await;
            tracing::debug!(
                sku = %product.sku,
                results = outcome.results.len(),
                failures = outcome.failures.len(),
                "scrape sweep finished"
            );
            failures.extend(outcome.failures);
            apply_merged(&mut product, merge_scraped(&outcome.results));
        }

        apply_facts(&mut product);

        if !failures.is_empty() {
            tracing::warn!(sku = %product.sku, failures = failures.len(), "enrichment degraded");
            product.enrichment_error = Some(failures.join("; "));
        }
        tracing::info!(
            sku = %product.sku,
            dietary = product.dietary.len(),
            allergens = product.allergens.len(),
            nutrition_source = product.nutrition_source().map_or("none", DataSource::label),
            "enriched product"
        );
        product
    }

    /// Enrich a batch, preserving input order.
    pub async fn enrich_batch(&self, products: Vec<Product>) -> Vec<Product> {
        let total = products.len();
        stream::iter(products.into_iter().enumerate())
            .map(|(index, product)| {
                let span = tracing::info_span!(
                    "enrich",
                    item = index + 1,
                    total,
                    sku = %product.sku
                );
                self.enrich(product).instrument(span)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }
}

#[cfg(test)]
#[path = "enricher_test.rs"]
mod tests;
