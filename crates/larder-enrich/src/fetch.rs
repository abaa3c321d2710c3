//! HTML page fetching for brand, supplier and fallback sites.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::error::EnrichError;
use crate::rate_limit::{extract_domain, retry_with_backoff, HostLimiter};

const BROWSER_FALLBACK_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Source of raw HTML for a URL.
pub trait PageFetcher: Send + Sync {
    /// Fetch the body of `url`.
    ///
    /// A 404 is reported as [`EnrichError::NotFound`]; callers treat it as
    /// "no data" rather than a failure.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, EnrichError>> + Send;
}

/// `reqwest`-backed fetcher with per-host spacing and transient retries.
///
/// Tries the configured user agent first, then a browser user agent, since
/// some storefronts hide content from obvious bots.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
    limiter: Arc<HostLimiter>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        limiter: Arc<HostLimiter>,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_owned(),
            limiter,
            max_retries,
            backoff_base_secs,
        })
    }

    async fn get_once(&self, url: &str, user_agent: &str) -> Result<String, EnrichError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(EnrichError::RateLimited {
                domain: extract_domain(url),
                retry_after_secs,
            });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichError::NotFound {
                url: url.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(EnrichError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        if !is_usable_html(&body) {
            return Err(EnrichError::UnusableHtml {
                url: url.to_owned(),
            });
        }
        Ok(body)
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, EnrichError> {
        let mut user_agents = vec![self.user_agent.as_str()];
        if self.user_agent != BROWSER_FALLBACK_UA {
            user_agents.push(BROWSER_FALLBACK_UA);
        }

        let mut last_err = None;
        for ua in user_agents {
            self.limiter.wait(url).await;
            match retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
                self.get_once(url, ua)
            })
            .await
            {
                Ok(body) => return Ok(body),
                Err(err @ EnrichError::NotFound { .. }) => return Err(err),
                Err(err) => {
                    tracing::debug!(url, user_agent = ua, error = %err, "page fetch failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| EnrichError::UnusableHtml {
            url: url.to_owned(),
        }))
    }
}

/// Markers that mean the page is an interstitial rather than the product.
///
/// Any one is enough on a short page; long pages must carry two, since a
/// real product page may mention cookies or a trade login in its footer.
const INTERSTITIAL_MARKERS: [&str; 10] = [
    "/cdn-cgi/challenge-platform/",
    "cf-chl-",
    "attention required! | cloudflare",
    "just a moment...",
    "verify you are human",
    "g-recaptcha",
    "h-captcha",
    "please enable cookies",
    "login to view prices",
    "trade customers only",
];

/// A real product page is rarely this small once scripts are included.
const SHORT_PAGE_BYTES: usize = 4_096;

fn is_usable_html(body: &str) -> bool {
    let trimmed = body.trim();
    !trimmed.is_empty() && !is_interstitial(trimmed)
}

/// `true` for bot challenges, captchas and trade-only login walls.
fn is_interstitial(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    let hits = INTERSTITIAL_MARKERS
        .iter()
        .filter(|marker| lowered.contains(*marker))
        .count();
    let needed = if lowered.len() < SHORT_PAGE_BYTES && !lowered.contains("add to basket") {
        1
    } else {
        2
    };
    hits >= needed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_pages_are_unusable() {
        assert!(!is_usable_html("   "));
        assert!(!is_usable_html(
            "<title>Just a moment...</title><p>Please enable cookies.</p>"
        ));
        assert!(!is_usable_html(
            "<script src=\"/cdn-cgi/challenge-platform/h/b\"></script>"
        ));
        assert!(!is_usable_html(
            "<h1>Wholesale Catalogue</h1><p>Trade customers only. Login to view prices.</p>"
        ));
    }

    #[test]
    fn product_pages_with_incidental_markers_are_usable() {
        assert!(is_usable_html(
            "<h1>Miso Paste</h1><button>Add to basket</button><p>Just a moment...</p>"
        ));
        let footer = format!(
            "<h1>Brown Rice Miso</h1>{}<footer>Please enable cookies for the best experience.</footer>",
            "<p>Unpasteurised, aged for 18 months.</p>".repeat(150)
        );
        assert!(is_usable_html(&footer));
    }
}
