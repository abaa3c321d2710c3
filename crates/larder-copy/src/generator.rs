//! Per-product copy generation with retry and placeholder fallback.

use std::time::Duration;

use larder_core::{Descriptions, Product};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::client::CompletionClient;
use crate::error::CopyError;
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::response::parse_response;
use crate::sanitize::sanitize_descriptions;

/// Generates storefront copy through an injected [`CompletionClient`].
pub struct CopyWriter<C> {
    client: C,
    max_attempts: u32,
    backoff_base: Duration,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

/// Copy attached when generation fails, so the product still exports.
fn placeholder(product: &Product) -> Descriptions {
    Descriptions {
        title: product.name.clone(),
        body_html: "<p>Unable to generate description.</p>".to_owned(),
        short_description: "<p>Description coming soon</p>".to_owned(),
        meta_description: "Product description generation failed.".to_owned(),
        dietary_preferences: Vec::new(),
        brand: product.brand.clone(),
    }
}

impl<C: CompletionClient> CopyWriter<C> {
    /// `max_attempts` is clamped to at least one. Waits between attempts
    /// default to `2^attempt` seconds.
    #[must_use]
    pub fn new(client: C, max_attempts: u32) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            backoff_base: Duration::from_secs(1),
            min_interval: Duration::ZERO,
            last_call: Mutex::new(None),
        }
    }

    /// Scale the wait between attempts to `base * 2^attempt`.
    #[must_use]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Keep at least `interval` between the start of consecutive model
    /// calls, retries included.
    #[must_use]
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    async fn pace(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        *last_call = Some(Instant::now());
    }

    async fn attempt(&self, product: &Product, prompt: &str) -> Result<Descriptions, CopyError> {
        self.pace().await;
        let content = self.client.complete(SYSTEM_PROMPT, prompt).await?;
        let mut descriptions = parse_response(&content)?;
        sanitize_descriptions(&mut descriptions, &product.name);
        Ok(descriptions)
    }

    /// Generate copy for one product, retrying any failure.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's [`CopyError`] once every attempt failed.
    pub async fn generate(&self, product: &Product) -> Result<Descriptions, CopyError> {
        let prompt = build_prompt(product);
        let mut attempt = 1;
        loop {
            tracing::debug!(product = %product.name, attempt, "requesting copy");
            match self.attempt(product, &prompt).await {
                Ok(descriptions) => return Ok(descriptions),
                Err(e) if attempt < self.max_attempts => {
                    let delay = self.backoff_base * 2u32.saturating_pow(attempt);
                    tracing::warn!(
                        product = %product.name,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "copy generation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Attach generated copy to `product`. A terminal failure is recorded
    /// on `generation_error` with placeholder copy in place.
    pub async fn describe(&self, mut product: Product) -> Product {
        match self.generate(&product).await {
            Ok(descriptions) => {
                tracing::info!(product = %product.name, "generated copy");
                product.descriptions = Some(descriptions);
            }
            Err(e) => {
                tracing::error!(
                    product = %product.name,
                    attempts = self.max_attempts,
                    error = %e,
                    "copy generation failed"
                );
                product.descriptions = Some(placeholder(&product));
                product.generation_error = Some(e.to_string());
            }
        }
        product
    }

    /// Describe products one at a time, in order.
    pub async fn describe_batch(&self, products: Vec<Product>) -> Vec<Product> {
        let total = products.len();
        let mut described = Vec::with_capacity(total);
        for (index, product) in products.into_iter().enumerate() {
            tracing::info!(item = index + 1, total, product = %product.name, "writing copy");
            described.push(self.describe(product).await);
        }
        described
    }
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
