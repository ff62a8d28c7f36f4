//! Cache-fronted search pipeline.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{CacheKey, ResultCache, BATCH_TTL, SIMPLE_TTL};
use crate::config::Settings;
use crate::error::HarvestError;
use crate::models::{JobRecord, SearchSpec};
use crate::query::QueryBuilder;
use crate::scrapers::listing::site_origin;
use crate::scrapers::{
    DescriptionEnricher, HttpClient, ListingExtractor, PageFetcher, PaginationController,
    RetryPolicy, UserAgentPool,
};

/// Named bundles of pipeline behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Bounded attempts, keyword-location keys, 30 minute TTL, descriptions.
    Simple,
    /// Consecutive-error backoff, canonical URL keys, 60 minute TTL.
    #[default]
    Batch,
}

impl Preset {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "simple" => Some(Self::Simple),
            "batch" => Some(Self::Batch),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Batch => "batch",
        }
    }

    pub fn retry_policy(self) -> RetryPolicy {
        match self {
            Self::Simple => RetryPolicy::bounded_attempt(),
            Self::Batch => RetryPolicy::consecutive_error(),
        }
    }

    pub fn cache_key(self) -> CacheKey {
        match self {
            Self::Simple => CacheKey::KeywordLocation,
            Self::Batch => CacheKey::CanonicalUrl,
        }
    }

    pub fn cache_ttl(self) -> Duration {
        match self {
            Self::Simple => SIMPLE_TTL,
            Self::Batch => BATCH_TTL,
        }
    }

    pub fn enrich_descriptions(self) -> bool {
        matches!(self, Self::Simple)
    }
}

/// Answers searches from the cache, crawling on a miss.
pub struct Harvester {
    controller: PaginationController,
    cache: Arc<ResultCache>,
    cache_key: CacheKey,
}

impl Harvester {
    pub fn new(controller: PaginationController, cache: Arc<ResultCache>, cache_key: CacheKey) -> Self {
        Self {
            controller,
            cache,
            cache_key,
        }
    }

    /// Build the live pipeline described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, HarvestError> {
        let client = HttpClient::with_user_agents(
            settings.request_policy(),
            UserAgentPool::new(settings.user_agents.clone()),
        )?;
        Self::with_fetcher(settings, Arc::new(client))
    }

    /// Build the pipeline described by `settings` on top of any fetcher.
    pub fn with_fetcher(
        settings: &Settings,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, HarvestError> {
        let query = QueryBuilder::new(&settings.search_url);
        let mut extractor = ListingExtractor::new()?;
        if let Some(origin) = site_origin(query.base_url()) {
            extractor = extractor.with_origin(&origin);
        }
        let mut controller = PaginationController::new(
            fetcher.clone(),
            query,
            Arc::new(extractor),
            settings.retry_policy(),
        );
        if settings.enrich_descriptions() {
            controller = controller.with_enricher(
                DescriptionEnricher::new(fetcher).with_concurrency(settings.enrich_concurrency),
            );
        }

        info!(
            preset = settings.preset.name(),
            policy = settings.retry_policy().name(),
            cache_key = ?settings.cache_key(),
            cache_ttl_secs = settings.cache_ttl().as_secs(),
            "Harvester configured"
        );

        Ok(Self::new(
            controller,
            Arc::new(ResultCache::new(settings.cache_ttl())),
            settings.cache_key(),
        ))
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Search, serving from cache when a stored result covers the request.
    pub async fn search(&self, spec: &SearchSpec) -> Result<Vec<JobRecord>, HarvestError> {
        let key = self.cache_key.key_for(spec, self.controller.query());

        if let Some(records) = self.cache.get(&key, spec.limit) {
            debug!(key = %key, records = records.len(), "Cache hit");
            return Ok(records);
        }

        let outcome = self.controller.crawl(spec).await?;

        // Don't pin an empty result from a crawl that failed outright.
        if !outcome.records.is_empty() || outcome.is_complete() {
            self.cache
                .set(key, outcome.records.clone(), outcome.is_complete());
        }

        Ok(outcome.records)
    }
}
