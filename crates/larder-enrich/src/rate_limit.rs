//! Politeness and retry utilities for outbound enrichment requests.
//!
//! [`HostLimiter`] enforces a minimum interval between consecutive requests
//! to the same host, shared across every product in a batch.
//! [`retry_with_backoff`] retries rate limits, server errors and dropped
//! connections with exponential backoff.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::EnrichError;

/// Host part of `url`, lowercased. Falls back to stripping the scheme.
pub(crate) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| {
            url.trim_start_matches("https://")
                .trim_start_matches("http://")
                .split('/')
                .next()
                .unwrap_or(url)
                .to_lowercase()
        })
}

/// Minimum-interval limiter keyed by host.
///
/// Not a token bucket: each host simply gets its next free slot pushed
/// `min_interval` into the future whenever a request is admitted.
#[derive(Debug)]
pub struct HostLimiter {
    min_interval: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

/// Claim the next slot for `host` and return the instant it starts.
fn reserve(
    slots: &mut HashMap<String, Instant>,
    host: &str,
    now: Instant,
    min_interval: Duration,
) -> Instant {
    let start = slots
        .get(host)
        .copied()
        .filter(|slot| *slot > now)
        .unwrap_or(now);
    slots.insert(host.to_string(), start + min_interval);
    start
}

impl HostLimiter {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until a request to `url`'s host may be sent.
    pub async fn wait(&self, url: &str) {
        if self.min_interval.is_zero() {
            return;
        }
        let host = extract_domain(url);
        let start = {
            let mut slots = self.next_slot.lock().await;
            reserve(&mut slots, &host, Instant::now(), self.min_interval)
        };
        if start > Instant::now() {
            tracing::trace!(host = %host, "waiting for host slot");
            tokio::time::sleep_until(start).await;
        }
    }
}

/// Longest `Retry-After` honoured before retrying a 429.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// How long to wait before retrying `err`, or `None` when a retry cannot help.
///
/// Open Food Facts and supplier storefronts answer 5xx while they are
/// overloaded or deploying, so those are retried like dropped connections.
/// A 429 waits for the server's `Retry-After` when that is longer than the
/// backoff. A 404, any other 4xx, a payload that does not parse, or a
/// challenge page gets the same answer next time.
fn retry_delay(err: &EnrichError, backoff: Duration) -> Option<Duration> {
    match err {
        EnrichError::RateLimited {
            retry_after_secs, ..
        } => Some(backoff.max(Duration::from_secs(*retry_after_secs).min(MAX_RETRY_AFTER))),
        EnrichError::UnexpectedStatus { status, .. } if *status >= 500 => Some(backoff),
        EnrichError::Http(e) if !e.is_decode() && !e.is_builder() => Some(backoff),
        EnrichError::Http(_)
        | EnrichError::UnexpectedStatus { .. }
        | EnrichError::NotFound { .. }
        | EnrichError::Deserialize { .. }
        | EnrichError::UnusableHtml { .. } => None,
    }
}

/// Run one outbound request, retrying it up to `max_retries` more times.
///
/// Backoff doubles from `backoff_base_secs`: with a base of 2 the retries
/// wait 2s, 4s, 8s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut request: F,
) -> Result<T, EnrichError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EnrichError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match request().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        let backoff =
            Duration::from_secs(backoff_base_secs.saturating_mul(1u64 << retry.min(62)));
        let delay = match retry_delay(&err, backoff) {
            Some(delay) if retry < max_retries => delay,
            _ => return Err(err),
        };
        retry += 1;
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = delay.as_millis(),
            error = %err,
            "enrichment request failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn rate_limited() -> EnrichError {
        EnrichError::RateLimited {
            domain: "world.openfoodfacts.org".to_owned(),
            retry_after_secs: 0,
        }
    }

    #[test]
    fn domain_is_host_only() {
        assert_eq!(
            extract_domain("https://World.OpenFoodFacts.org/api/v2/product/1.json"),
            "world.openfoodfacts.org"
        );
        assert_eq!(extract_domain("shop.example.com/search"), "shop.example.com");
    }

    #[test]
    fn same_host_slots_are_spaced_by_interval() {
        let mut slots = HashMap::new();
        let now = Instant::now();
        let gap = Duration::from_millis(600);
        let first = reserve(&mut slots, "a.example", now, gap);
        let second = reserve(&mut slots, "a.example", now, gap);
        let other = reserve(&mut slots, "b.example", now, gap);
        assert_eq!(first, now);
        assert_eq!(second, now + gap);
        assert_eq!(other, now);
    }

    #[test]
    fn expired_slot_does_not_delay() {
        let mut slots = HashMap::new();
        let start = Instant::now();
        let gap = Duration::from_millis(10);
        reserve(&mut slots, "a.example", start, gap);
        let later = start + Duration::from_secs(1);
        assert_eq!(reserve(&mut slots, "a.example", later, gap), later);
    }

    #[tokio::test]
    async fn limiter_spaces_requests_to_one_host() {
        let limiter = HostLimiter::new(Duration::from_millis(40));
        let started = std::time::Instant::now();
        limiter.wait("https://a.example/1").await;
        limiter.wait("https://a.example/2").await;
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    fn status(code: u16) -> EnrichError {
        EnrichError::UnexpectedStatus {
            status: code,
            url: "https://world.openfoodfacts.org/api/v2/product/1.json".to_owned(),
        }
    }

    #[test]
    fn server_errors_and_rate_limits_are_retried() {
        let backoff = Duration::from_secs(2);
        assert_eq!(retry_delay(&status(503), backoff), Some(backoff));
        assert_eq!(retry_delay(&status(500), backoff), Some(backoff));
        assert_eq!(retry_delay(&rate_limited(), backoff), Some(backoff));
    }

    #[test]
    fn retry_after_beyond_backoff_is_honoured_up_to_a_cap() {
        let backoff = Duration::from_secs(1);
        let slow = EnrichError::RateLimited {
            domain: "shop.example".to_owned(),
            retry_after_secs: 30,
        };
        let hostile = EnrichError::RateLimited {
            domain: "shop.example".to_owned(),
            retry_after_secs: 86_400,
        };
        assert_eq!(retry_delay(&slow, backoff), Some(Duration::from_secs(30)));
        assert_eq!(retry_delay(&hostile, backoff), Some(MAX_RETRY_AFTER));
    }

    #[test]
    fn client_side_answers_are_final() {
        let backoff = Duration::from_secs(1);
        assert_eq!(retry_delay(&status(403), backoff), None);
        assert_eq!(
            retry_delay(
                &EnrichError::NotFound {
                    url: "https://world.openfoodfacts.org/api/v2/product/1.json".to_owned(),
                },
                backoff
            ),
            None
        );
        assert_eq!(
            retry_delay(
                &EnrichError::UnusableHtml {
                    url: "https://shop.example/p".to_owned(),
                },
                backoff
            ),
            None
        );
        let bad_json = serde_json::from_str::<u32>("{").unwrap_err();
        assert_eq!(
            retry_delay(
                &EnrichError::Deserialize {
                    context: "product".to_owned(),
                    source: bad_json,
                },
                backoff
            ),
            None
        );
    }

    #[tokio::test]
    async fn first_success_is_returned_without_retry() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_with_backoff(3, 0, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, EnrichError>("Porridge Oats")
        })
        .await;
        assert_eq!(result.unwrap(), "Porridge Oats");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn overloaded_server_recovers_within_budget() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_with_backoff(2, 0, || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(status(502)),
                1 => Err(rate_limited()),
                _ => Ok::<_, EnrichError>(7u32),
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn last_error_surfaces_once_retries_run_out() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_with_backoff(2, 0, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>(status(503))
        })
        .await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(EnrichError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn missing_product_is_not_requested_again() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_with_backoff(3, 0, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>(EnrichError::NotFound {
                url: "https://world.openfoodfacts.org/api/v2/product/1.json".to_owned(),
            })
        })
        .await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(EnrichError::NotFound { .. })));
    }
}
