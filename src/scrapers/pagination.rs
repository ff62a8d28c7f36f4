//! Sequential page-by-page crawling with retry policies.
//!
//! The controller fetches one listing page at a time, waits for it to be
//! parsed (and optionally enriched), then decides whether to continue,
//! back off, or stop. Pages are never fetched concurrently; the delays are
//! what keeps the crawl under the source's rate limits.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{random_delay, DescriptionEnricher, ListingExtractor, PageFetcher};
use crate::error::{HarvestError, PageError};
use crate::models::{JobRecord, SearchSpec};
use crate::query::{QueryBuilder, PAGE_SIZE};

/// How failed pages are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryPolicy {
    /// One attempt counter shared by the whole crawl.
    ///
    /// Fetch failures end the crawl immediately. Other page errors sleep
    /// `backoff_unit * attempts` and retry; a good page resets the counter.
    BoundedAttempt {
        max_attempts: u32,
        backoff_unit: Duration,
    },
    /// Counts consecutive failures of any kind.
    ///
    /// Each failure sleeps `backoff_unit * 2^failures`; a good page resets
    /// the counter and is followed by a jittered inter-page delay.
    ConsecutiveError {
        max_consecutive: u32,
        backoff_unit: Duration,
        page_delay_min: Duration,
        page_delay_max: Duration,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::consecutive_error()
    }
}

impl RetryPolicy {
    pub const BOUNDED_ATTEMPT: &'static str = "bounded-attempt";
    pub const CONSECUTIVE_ERROR: &'static str = "consecutive-error";

    /// 5 attempts, linear 5s backoff.
    pub fn bounded_attempt() -> Self {
        Self::BoundedAttempt {
            max_attempts: 5,
            backoff_unit: Duration::from_millis(5000),
        }
    }

    /// 3 consecutive failures, exponential 1s backoff, 2-3s between pages.
    pub fn consecutive_error() -> Self {
        Self::ConsecutiveError {
            max_consecutive: 3,
            backoff_unit: Duration::from_millis(1000),
            page_delay_min: Duration::from_millis(2000),
            page_delay_max: Duration::from_millis(3000),
        }
    }

    /// Look up a preset by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            Self::BOUNDED_ATTEMPT => Some(Self::bounded_attempt()),
            Self::CONSECUTIVE_ERROR => Some(Self::consecutive_error()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BoundedAttempt { .. } => Self::BOUNDED_ATTEMPT,
            Self::ConsecutiveError { .. } => Self::CONSECUTIVE_ERROR,
        }
    }

    fn max_failures(&self) -> u32 {
        match self {
            Self::BoundedAttempt { max_attempts, .. } => *max_attempts,
            Self::ConsecutiveError {
                max_consecutive, ..
            } => *max_consecutive,
        }
    }

    /// Whether a failed fetch ends the crawl instead of being retried.
    fn stops_on_fetch_failure(&self) -> bool {
        matches!(self, Self::BoundedAttempt { .. })
    }

    /// Sleep before retrying after the `failures`-th failure.
    pub fn backoff(&self, failures: u32) -> Duration {
        match self {
            Self::BoundedAttempt { backoff_unit, .. } => backoff_unit.saturating_mul(failures),
            Self::ConsecutiveError { backoff_unit, .. } => {
                backoff_unit.saturating_mul(2u32.saturating_pow(failures))
            }
        }
    }

    /// Pause between successful pages, if any.
    fn page_delay(&self) -> Option<Duration> {
        match self {
            Self::BoundedAttempt { .. } => None,
            Self::ConsecutiveError {
                page_delay_min,
                page_delay_max,
                ..
            } => Some(random_delay(*page_delay_min, *page_delay_max)),
        }
    }
}

/// Why a crawl stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back with no records.
    EmptyPage,
    /// A fetch failed under a policy that does not retry fetches.
    FetchFailed,
    /// The requested limit was reached.
    LimitReached,
    /// The retry budget ran out.
    RetriesExhausted,
    /// A page contained only records already seen.
    NoNewRecords,
}

/// Result of one crawl.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub records: Vec<JobRecord>,
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

impl CrawlOutcome {
    /// The source ran out of results before anything else stopped the crawl.
    pub fn is_complete(&self) -> bool {
        matches!(
            self.stop_reason,
            StopReason::EmptyPage | StopReason::NoNewRecords
        )
    }
}

/// Drives query building, fetching, extraction, and retry for one search.
#[derive(Clone)]
pub struct PaginationController {
    fetcher: Arc<dyn PageFetcher>,
    query: QueryBuilder,
    extractor: Arc<ListingExtractor>,
    enricher: Option<DescriptionEnricher>,
    policy: RetryPolicy,
}

impl PaginationController {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        query: QueryBuilder,
        extractor: Arc<ListingExtractor>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            query,
            extractor,
            enricher: None,
            policy,
        }
    }

    /// Fill descriptions for each page's new records.
    pub fn with_enricher(mut self, enricher: DescriptionEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    async fn fetch_page(&self, url: &str) -> Result<Vec<JobRecord>, PageError> {
        let body = self.fetcher.fetch(url).await?;
        Ok(self.extractor.parse_page(&body)?)
    }

    /// Crawl pages until the source is exhausted, the limit is reached, or
    /// the retry policy gives up. Exhaustion is not an error.
    pub async fn crawl(&self, spec: &SearchSpec) -> Result<CrawlOutcome, HarvestError> {
        let mut records: Vec<JobRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut start: u32 = 0;
        let mut failures: u32 = 0;
        let mut pages_fetched: u32 = 0;

        info!(
            keyword = spec.keyword(),
            location = spec.location(),
            policy = self.policy.name(),
            "Starting crawl"
        );

        let stop_reason = loop {
            let url = self.query.build(spec, start);

            match self.fetch_page(&url).await {
                Ok(page) => {
                    pages_fetched += 1;
                    failures = 0;

                    if page.is_empty() {
                        break StopReason::EmptyPage;
                    }

                    let page_len = page.len();
                    let mut fresh: Vec<JobRecord> = page
                        .into_iter()
                        .filter(|r| seen.insert(r.dedup_key()))
                        .collect();
                    if fresh.is_empty() {
                        debug!("Page at start={} repeated {} known records", start, page_len);
                        break StopReason::NoNewRecords;
                    }
                    if spec.limit > 0 {
                        fresh.truncate(spec.limit.saturating_sub(records.len()));
                    }
                    if let Some(ref enricher) = self.enricher {
                        fresh = enricher.enrich(fresh).await;
                    }
                    records.extend(fresh);

                    debug!(
                        start,
                        page_len,
                        total = records.len(),
                        "Fetched listing page"
                    );

                    if spec.limit > 0 && records.len() >= spec.limit {
                        break StopReason::LimitReached;
                    }

                    start = start.checked_add(PAGE_SIZE).ok_or_else(|| {
                        HarvestError::Internal("page offset overflowed".to_string())
                    })?;

                    if let Some(delay) = self.policy.page_delay() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(PageError::Fetch(e)) if self.policy.stops_on_fetch_failure() => {
                    warn!("Fetch failed for {}, ending crawl: {}", url, e);
                    break StopReason::FetchFailed;
                }
                Err(e) => {
                    failures += 1;
                    if failures >= self.policy.max_failures() {
                        warn!(
                            "Giving up after {} failures at start={}: {}",
                            failures, start, e
                        );
                        break StopReason::RetriesExhausted;
                    }
                    let backoff = self.policy.backoff(failures);
                    warn!(
                        failures,
                        kind = ?e.kind(),
                        backoff_ms = backoff.as_millis() as u64,
                        "Page failed, backing off: {}",
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        };

        info!(
            records = records.len(),
            pages_fetched,
            stop_reason = ?stop_reason,
            "Crawl finished"
        );

        Ok(CrawlOutcome {
            records,
            pages_fetched,
            stop_reason,
        })
    }
}
