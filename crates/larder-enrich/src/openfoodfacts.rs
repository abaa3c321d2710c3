//! Open Food Facts barcode lookup.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use larder_core::{DataSource, Nutrition};
use larder_facts::text::title_case;
use larder_facts::{parse_nutrition, NutritionInput};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::EnrichError;
use crate::lookup::Lookup;
use crate::rate_limit::{extract_domain, retry_with_backoff, HostLimiter};

/// Facts returned for one barcode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarcodeFacts {
    pub nutrition: Nutrition,
    pub ingredients: String,
    pub allergens: Vec<String>,
    pub product_name: String,
    pub brands: String,
}

impl BarcodeFacts {
    fn is_empty(&self) -> bool {
        self.nutrition.is_empty() && self.ingredients.is_empty() && self.allergens.is_empty()
    }
}

/// Nutrition lookup keyed by a normalised barcode.
pub trait BarcodeLookup: Send + Sync {
    fn lookup(&self, barcode: &str) -> impl Future<Output = Lookup<BarcodeFacts>> + Send;
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    product: Option<ProductBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ProductBody {
    #[serde(default)]
    nutriments: Map<String, Value>,
    #[serde(default)]
    ingredients_text: Option<String>,
    #[serde(default)]
    allergens_tags: Vec<String>,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    brands: Option<String>,
}

/// `en:milk` -> `Milk`, `en:sulphur-dioxide-and-sulphites` -> `Sulphur Dioxide And Sulphites`.
fn allergen_from_tag(tag: &str) -> String {
    let name = tag.split_once(':').map_or(tag, |(_, rest)| rest);
    title_case(&name.replace('-', " "))
}

fn is_lookup_barcode(barcode: &str) -> bool {
    (8..=14).contains(&barcode.len()) && barcode.bytes().all(|b| b.is_ascii_digit())
}

/// HTTP client for the Open Food Facts v2 product API.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
    limiter: Arc<HostLimiter>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl OpenFoodFactsClient {
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        limiter: Arc<HostLimiter>,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            limiter,
            max_retries,
            backoff_base_secs,
        })
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v2/product/{barcode}.json", self.base_url)
    }

    /// Fetch the product for `barcode`.
    ///
    /// Returns `Ok(None)` for an unknown product, an invalid barcode, or a
    /// product with no usable facts.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::RateLimited`] / [`EnrichError::Http`] after retries.
    /// - [`EnrichError::UnexpectedStatus`] for non-2xx, non-404 responses.
    /// - [`EnrichError::Deserialize`] when the body is not the expected JSON.
    pub async fn fetch_product(&self, barcode: &str) -> Result<Option<BarcodeFacts>, EnrichError> {
        let barcode: String = barcode
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if !is_lookup_barcode(&barcode) {
            tracing::warn!(barcode = %barcode, "invalid barcode format, skipping lookup");
            return Ok(None);
        }

        let url = self.product_url(&barcode);
        self.limiter.wait(&url).await;

        let parsed = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let barcode = barcode.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(EnrichError::RateLimited {
                        domain: extract_domain(&url),
                        retry_after_secs,
                    });
                }
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(EnrichError::NotFound { url });
                }
                if !status.is_success() {
                    return Err(EnrichError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<ProductResponse>(&body).map_err(|e| {
                    EnrichError::Deserialize {
                        context: format!("Open Food Facts product {barcode}"),
                        source: e,
                    }
                })
            }
        })
        .await;

        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(EnrichError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        if parsed.status.as_ref().and_then(Value::as_i64) != Some(1) {
            return Ok(None);
        }
        let Some(product) = parsed.product else {
            return Ok(None);
        };

        let facts = BarcodeFacts {
            nutrition: parse_nutrition(NutritionInput::OpenFoodFacts(&product.nutriments)),
            ingredients: product.ingredients_text.unwrap_or_default().trim().to_owned(),
            allergens: product
                .allergens_tags
                .iter()
                .map(|t| allergen_from_tag(t))
                .filter(|a| !a.is_empty())
                .collect(),
            product_name: product.product_name.unwrap_or_default(),
            brands: product.brands.unwrap_or_default(),
        };
        Ok((!facts.is_empty()).then_some(facts))
    }
}

impl BarcodeLookup for OpenFoodFactsClient {
    async fn lookup(&self, barcode: &str) -> Lookup<BarcodeFacts> {
        let lookup = Lookup::from_result(
            self.fetch_product(barcode).await,
            DataSource::OpenFoodFacts,
        );
        match &lookup {
            Lookup::Found { value, .. } => tracing::debug!(
                barcode,
                nutrients = value.nutrition.len(),
                "Open Food Facts hit"
            ),
            Lookup::NotFound => tracing::info!(barcode, "product not found in Open Food Facts"),
            Lookup::Failed(reason) => {
                tracing::warn!(barcode, error = %reason, "Open Food Facts lookup failed");
            }
        }
        lookup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allergen_tags_are_title_cased_without_language() {
        assert_eq!(allergen_from_tag("en:milk"), "Milk");
        assert_eq!(
            allergen_from_tag("en:sulphur-dioxide-and-sulphites"),
            "Sulphur Dioxide And Sulphites"
        );
        assert_eq!(allergen_from_tag("gluten"), "Gluten");
    }

    #[test]
    fn lookup_barcode_must_be_8_to_14_digits() {
        assert!(is_lookup_barcode("50600000"));
        assert!(is_lookup_barcode("5060000000000"));
        assert!(!is_lookup_barcode("1234567"));
        assert!(!is_lookup_barcode("50600000000001234"));
        assert!(!is_lookup_barcode("50600000x"));
    }
}
