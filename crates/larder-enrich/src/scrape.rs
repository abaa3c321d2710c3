//! Brand, supplier and fallback-site scraping.
//!
//! Each entry point returns a [`Lookup`]: a page that yields nothing is
//! `NotFound`, a page that could not be fetched is `Failed`.

use larder_core::{
    slugify, BrandSiteConfig, DataSource, FallbackSite, SelectorSet, SourceTier, SupplierConfig,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::EnrichError;
use crate::extract::{extract_page, find_product_link, ScrapedPage};
use crate::fetch::PageFetcher;
use crate::lookup::Lookup;

/// Link selectors used on fallback search pages, which carry no config.
const GENERIC_PRODUCT_LINKS: [&str; 4] = [
    ".product-item a",
    ".product-card a",
    "a[href*='/product']",
    "a[href*='/p/']",
];

/// Fallback sites consulted per product, at most.
pub const MAX_FALLBACK_SITES: usize = 2;

/// One scraped page with where it came from and how far it is trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeResult {
    pub page: ScrapedPage,
    pub source: DataSource,
    pub tier: SourceTier,
}

fn search_url(pattern: &str, query: &str) -> String {
    let encoded = utf8_percent_encode(query.trim(), NON_ALPHANUMERIC).to_string();
    pattern.replace("{query}", &encoded)
}

/// Fetch and extract one page. `Ok(None)` for a 404 or an empty page.
async fn fetch_page<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    selectors: &SelectorSet,
) -> Result<Option<ScrapedPage>, EnrichError> {
    match fetcher.fetch(url).await {
        Ok(html) => {
            let page = extract_page(&html, selectors);
            Ok((!page.is_empty()).then_some(page))
        }
        Err(EnrichError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Search a brand's own site and scrape the matching product page.
///
/// Searches by barcode when one exists, then by name if the barcode search
/// turns up no matching link.
pub async fn scrape_brand_site<F: PageFetcher>(
    fetcher: &F,
    site: &BrandSiteConfig,
    name: &str,
    barcode: &str,
) -> Lookup<ScrapedPage> {
    let mut queries = Vec::with_capacity(2);
    if !barcode.is_empty() {
        queries.push(barcode);
    }
    queries.push(name);

    let mut product_url = None;
    for query in queries {
        let url = search_url(&site.search_url, query);
        match fetcher.fetch(&url).await {
            Ok(html) => {
                product_url = find_product_link(&html, &site.product_link, &site.base_url, name);
                if product_url.is_some() {
                    break;
                }
            }
            Err(EnrichError::NotFound { .. }) => {}
            Err(e) => {
                tracing::warn!(brand = %site.name, url = %url, error = %e, "brand search failed");
                return Lookup::Failed(e.to_string());
            }
        }
    }

    let Some(product_url) = product_url else {
        tracing::info!(brand = %site.name, product = name, "no product found on brand website");
        return Lookup::NotFound;
    };
    tracing::debug!(brand = %site.name, url = %product_url, "found brand product page");

    Lookup::from_result(
        fetch_page(fetcher, &product_url, &site.selectors).await,
        DataSource::BrandWebsite,
    )
}

/// Candidate product URLs for a supplier: every pattern with the barcode
/// first, then every pattern with the name slug.
fn supplier_urls(supplier: &SupplierConfig, barcode: &str, name: &str) -> Vec<String> {
    let base = supplier.base_url.trim_end_matches('/');
    let slug = slugify(name);
    let mut urls = Vec::new();
    for value in [barcode, slug.as_str()] {
        if value.is_empty() {
            continue;
        }
        for pattern in &supplier.product_url_patterns {
            let path = pattern
                .replace("{ean}", value)
                .replace("{sku}", value)
                .replace("{slug}", value);
            let url = format!("{base}{path}");
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }
    urls
}

/// Scrape a supplier's product page. Login-only suppliers are skipped.
pub async fn scrape_supplier<F: PageFetcher>(
    fetcher: &F,
    supplier: &SupplierConfig,
    name: &str,
    barcode: &str,
) -> Lookup<ScrapedPage> {
    if supplier.requires_login {
        tracing::debug!(supplier = %supplier.key, "supplier requires login, skipping");
        return Lookup::NotFound;
    }

    let mut last_failure = None;
    for url in supplier_urls(supplier, barcode, name) {
        match fetch_page(fetcher, &url, &supplier.selectors).await {
            Ok(Some(page)) => {
                tracing::debug!(supplier = %supplier.key, url = %url, "supplier page scraped");
                return Lookup::found(page, DataSource::Scraped(supplier.name.clone()));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(supplier = %supplier.key, url = %url, error = %e, "supplier fetch failed");
                last_failure = Some(e.to_string());
            }
        }
    }
    last_failure.map_or(Lookup::NotFound, Lookup::Failed)
}

/// Scrape a fallback search site: the results page itself, then the first
/// linked product page if the results page carried no ingredients.
pub async fn scrape_fallback<F: PageFetcher>(
    fetcher: &F,
    site: &FallbackSite,
    name: &str,
    barcode: &str,
) -> Lookup<ScrapedPage> {
    let query = if barcode.is_empty() { name } else { barcode };
    let url = search_url(&site.search_url, query);
    let source = DataSource::Scraped(site.name.clone());

    let html = match fetcher.fetch(&url).await {
        Ok(html) => html,
        Err(EnrichError::NotFound { .. }) => return Lookup::NotFound,
        Err(e) => return Lookup::Failed(e.to_string()),
    };
    let results_page = extract_page(&html, &SelectorSet::default());
    if !results_page.ingredients.is_empty() {
        return Lookup::found(results_page, source);
    }

    let links: Vec<String> = GENERIC_PRODUCT_LINKS.iter().map(|s| (*s).to_string()).collect();
    if let Some(product_url) = find_product_link(&html, &links, &site.search_url, name) {
        match fetch_page(fetcher, &product_url, &SelectorSet::default()).await {
            Ok(Some(page)) => return Lookup::found(page, source),
            Ok(None) => {}
            Err(e) => return Lookup::Failed(e.to_string()),
        }
    }
    if results_page.is_empty() {
        Lookup::NotFound
    } else {
        Lookup::found(results_page, source)
    }
}

/// Outcome of the supplier and fallback sweep for one product.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub results: Vec<ScrapeResult>,
    pub failures: Vec<String>,
}

/// Query every usable supplier, then up to [`MAX_FALLBACK_SITES`] fallback
/// sites when no supplier result carried ingredients.
pub async fn sweep_sources<F: PageFetcher>(
    fetcher: &F,
    suppliers: &[SupplierConfig],
    fallbacks: &[FallbackSite],
    name: &str,
    barcode: &str,
) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();

    for supplier in suppliers {
        match scrape_supplier(fetcher, supplier, name, barcode).await {
            Lookup::Found { value, source } => outcome.results.push(ScrapeResult {
                page: value,
                source,
                tier: supplier.tier,
            }),
            Lookup::NotFound => {}
            Lookup::Failed(reason) => outcome.failures.push(format!("{}: {reason}", supplier.name)),
        }
    }

    if outcome.results.iter().any(|r| !r.page.ingredients.is_empty()) {
        return outcome;
    }
    for site in fallbacks.iter().take(MAX_FALLBACK_SITES) {
        match scrape_fallback(fetcher, site, name, barcode).await {
            Lookup::Found { value, source } => {
                let has_ingredients = !value.ingredients.is_empty();
                outcome.results.push(ScrapeResult {
                    page: value,
                    source,
                    tier: site.tier,
                });
                if has_ingredients {
                    break;
                }
            }
            Lookup::NotFound => {}
            Lookup::Failed(reason) => outcome.failures.push(format!("{}: {reason}", site.name)),
        }
    }
    outcome
}
