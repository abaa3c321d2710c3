//! Multi-source product enrichment: Open Food Facts barcode lookup, brand
//! and supplier website scraping, weighted merging, and the per-product
//! cascade that fills only what earlier, more trusted sources left empty.

pub mod brand_merge;
pub mod enricher;
pub mod error;
pub mod extract;
pub mod facts;
pub mod fetch;
pub mod lookup;
pub mod merge;
pub mod openfoodfacts;
pub mod rate_limit;
pub mod scrape;

pub use brand_merge::{merge_brand_data, BrandRecord};
pub use enricher::Enricher;
pub use error::EnrichError;
pub use extract::{extract_page, ScrapedPage};
pub use fetch::{HttpFetcher, PageFetcher};
pub use lookup::Lookup;
pub use openfoodfacts::{BarcodeFacts, BarcodeLookup, OpenFoodFactsClient};
pub use rate_limit::HostLimiter;
