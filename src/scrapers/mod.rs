//! Fetch, extract, and paginate job listings.

pub mod description;
mod http_client;
pub mod listing;
pub mod pagination;

pub use description::DescriptionEnricher;
pub use http_client::{check_status, HttpClient, RequestPolicy, UserAgentPool, BROWSER_USER_AGENTS};
pub use listing::ListingExtractor;
pub use pagination::{CrawlOutcome, PaginationController, RetryPolicy, StopReason};

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::error::FetchError;

/// Something that can GET a URL and return its body.
///
/// [`HttpClient`] is the production implementation; the pipeline only ever
/// talks to this trait so pagination and enrichment can run against
/// scripted sources.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Uniformly sample a delay in `[min, max)`; returns `min` for an empty range.
pub fn random_delay(min: Duration, max: Duration) -> Duration {
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    if max_ms <= min_ms {
        return min;
    }
    Duration::from_millis(rand::rng().random_range(min_ms..max_ms))
}
