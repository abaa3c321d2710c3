use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::provenance::SourceTier;
use crate::ConfigError;

/// Candidate CSS selectors per extracted field, tried in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub nutrition: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub dietary: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
}

impl SelectorSet {
    fn all(&self) -> impl Iterator<Item = &String> {
        self.name
            .iter()
            .chain(&self.ingredients)
            .chain(&self.nutrition)
            .chain(&self.description)
            .chain(&self.dietary)
            .chain(&self.allergens)
    }
}

fn default_supplier_tier() -> SourceTier {
    SourceTier::Big4Supplier
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierConfig {
    pub key: String,
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub requires_login: bool,
    /// Paths relative to `base_url` with one of `{ean}`, `{sku}`, `{slug}`.
    #[serde(default)]
    pub product_url_patterns: Vec<String>,
    #[serde(default)]
    pub search_url: Option<String>,
    #[serde(default)]
    pub selectors: SelectorSet,
    #[serde(default = "default_supplier_tier")]
    pub tier: SourceTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandSiteConfig {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub base_url: String,
    /// Absolute search URL containing a `{query}` placeholder.
    pub search_url: String,
    #[serde(default)]
    pub product_link: Vec<String>,
    #[serde(default)]
    pub selectors: SelectorSet,
}

impl BrandSiteConfig {
    /// Whether a product's brand string refers to this site.
    ///
    /// Containment is checked both ways, so `"Clearspring Ltd"` and
    /// `"clear"` both resolve to `clearspring`.
    #[must_use]
    pub fn matches(&self, brand: &str) -> bool {
        let wanted = brand.trim().to_lowercase();
        if wanted.is_empty() {
            return false;
        }
        std::iter::once(&self.name)
            .chain(&self.aliases)
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .any(|n| wanted.contains(&n) || n.contains(&wanted))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSite {
    pub name: String,
    pub search_url: String,
    pub tier: SourceTier,
}

/// Positional column mapping for headerless supplier exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderlessLayout {
    pub brand: usize,
    pub code: usize,
    pub barcode: usize,
    pub brand_short: usize,
    pub description: usize,
    pub image_path: usize,
    pub flags_start: usize,
    /// Dietary tag name for each flag column, starting at `flags_start`.
    pub flag_columns: Vec<String>,
    /// Category column; `None` means the batch category applies.
    #[serde(default)]
    pub category: Option<usize>,
}

impl Default for HeaderlessLayout {
    fn default() -> Self {
        Self {
            brand: 0,
            code: 1,
            barcode: 2,
            brand_short: 3,
            description: 4,
            image_path: 5,
            flags_start: 6,
            flag_columns: ["Organic", "Vegan", "Gluten Free", "Fairtrade", "Palm Oil Free"]
                .into_iter()
                .map(String::from)
                .collect(),
            category: Some(11),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesFile {
    #[serde(default)]
    pub suppliers: Vec<SupplierConfig>,
    #[serde(default)]
    pub brands: Vec<BrandSiteConfig>,
    #[serde(default)]
    pub fallbacks: Vec<FallbackSite>,
    #[serde(default)]
    pub headerless_layout: HeaderlessLayout,
}

impl SourcesFile {
    /// First brand site whose name or alias matches `brand`.
    #[must_use]
    pub fn brand_site(&self, brand: &str) -> Option<&BrandSiteConfig> {
        self.brands.iter().find(|b| b.matches(brand))
    }
}

/// Load and validate the enrichment source configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources: SourcesFile = serde_yaml::from_str(&content)?;

    validate_sources(&sources)?;

    Ok(sources)
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn validate_sources(sources: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_keys = HashSet::new();
    for supplier in &sources.suppliers {
        if supplier.key.trim().is_empty() || supplier.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "supplier key and name must be non-empty".to_string(),
            ));
        }
        if !seen_keys.insert(supplier.key.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate supplier key: '{}'",
                supplier.key
            )));
        }
        if !is_http_url(&supplier.base_url) {
            return Err(ConfigError::Validation(format!(
                "supplier '{}' has non-http base_url '{}'",
                supplier.key, supplier.base_url
            )));
        }
        for pattern in &supplier.product_url_patterns {
            if !["{ean}", "{sku}", "{slug}"].iter().any(|p| pattern.contains(p)) {
                return Err(ConfigError::Validation(format!(
                    "supplier '{}' url pattern '{pattern}' has no {{ean}}, {{sku}} or {{slug}} placeholder",
                    supplier.key
                )));
            }
        }
        if let Some(search) = &supplier.search_url {
            if !search.contains("{query}") {
                return Err(ConfigError::Validation(format!(
                    "supplier '{}' search_url is missing {{query}}",
                    supplier.key
                )));
            }
        }
        validate_selectors(&supplier.key, &supplier.selectors)?;
    }

    let mut seen_brands = HashSet::new();
    for brand in &sources.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }
        if !seen_brands.insert(brand.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }
        if !is_http_url(&brand.base_url) || !is_http_url(&brand.search_url) {
            return Err(ConfigError::Validation(format!(
                "brand '{}' must use http(s) base_url and search_url",
                brand.name
            )));
        }
        if !brand.search_url.contains("{query}") {
            return Err(ConfigError::Validation(format!(
                "brand '{}' search_url is missing {{query}}",
                brand.name
            )));
        }
        if brand.product_link.is_empty() {
            return Err(ConfigError::Validation(format!(
                "brand '{}' needs at least one product_link selector",
                brand.name
            )));
        }
        validate_selectors(&brand.name, &brand.selectors)?;
    }

    for site in &sources.fallbacks {
        if !is_http_url(&site.search_url) || !site.search_url.contains("{query}") {
            return Err(ConfigError::Validation(format!(
                "fallback '{}' needs an http(s) search_url with {{query}}",
                site.name
            )));
        }
    }

    let layout = &sources.headerless_layout;
    if layout.flag_columns.iter().any(|c| c.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "headerless_layout flag column names must be non-empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_selectors(owner: &str, selectors: &SelectorSet) -> Result<(), ConfigError> {
    if selectors.all().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "'{owner}' has an empty CSS selector"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
