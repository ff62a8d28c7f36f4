//! Detail-page description enrichment.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::PageFetcher;
use crate::models::{JobRecord, DESCRIPTION_NOT_AVAILABLE};

/// Expanded long-form description container.
const PRIMARY_SELECTOR: &str = ".description__text .show-more-less-html";
/// Collapsed "show more/less" markup, present on older layouts.
const FALLBACK_SELECTOR: &str = ".show-more-less-html__markup";

/// Default number of detail pages fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Extract description text from a detail page, trying each selector in turn.
pub fn extract_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector_str in [PRIMARY_SELECTOR, FALLBACK_SELECTOR] {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = clean_description(&element.text().collect::<Vec<_>>());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    None
}

/// Join text nodes, dropping blank lines and trimming each line.
fn clean_description(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|p| p.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetches descriptions for job records.
///
/// Never fails: every fetch or parse problem becomes
/// [`DESCRIPTION_NOT_AVAILABLE`] for that record only.
#[derive(Clone)]
pub struct DescriptionEnricher {
    fetcher: Arc<dyn PageFetcher>,
    concurrency: usize,
}

impl DescriptionEnricher {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Description for one job, or the sentinel.
    pub async fn fetch_description(&self, job_url: &str) -> String {
        if job_url.is_empty() {
            return DESCRIPTION_NOT_AVAILABLE.to_string();
        }

        match self.fetcher.fetch(job_url).await {
            Ok(html) => extract_description(&html).unwrap_or_else(|| {
                debug!("No description found on {}", job_url);
                DESCRIPTION_NOT_AVAILABLE.to_string()
            }),
            Err(e) => {
                warn!("Failed to fetch description for {}: {}", job_url, e);
                DESCRIPTION_NOT_AVAILABLE.to_string()
            }
        }
    }

    /// Fill `description` on every record, preserving order.
    ///
    /// Fetches complete in any order so a slow page never holds back the
    /// ones queued behind it.
    pub async fn enrich(&self, records: Vec<JobRecord>) -> Vec<JobRecord> {
        let mut enriched: Vec<(usize, JobRecord)> = stream::iter(records.into_iter().enumerate())
            .map(|(index, mut record)| async move {
                record.description = Some(self.fetch_description(&record.job_url).await);
                (index, record)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        enriched.sort_by_key(|(index, _)| *index);
        enriched.into_iter().map(|(_, record)| record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct DetailPages {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for DetailPages {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages.get(url).cloned().ok_or(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn enricher(pages: &[(&str, &str)]) -> (DescriptionEnricher, Arc<DetailPages>) {
        let fetcher = Arc::new(DetailPages {
            pages: pages
                .iter()
                .map(|(u, b)| (u.to_string(), b.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        });
        (DescriptionEnricher::new(fetcher.clone()), fetcher)
    }

    #[test]
    fn test_primary_selector() {
        let html = r#"<html><body>
            <section class="description__text">
              <div class="show-more-less-html">
                <p>We build compilers.</p>
                <ul><li>Rust</li><li>LLVM</li></ul>
              </div>
            </section>
            <div class="show-more-less-html__markup">ignored</div>
        </body></html>"#;

        assert_eq!(
            extract_description(html).as_deref(),
            Some("We build compilers.\nRust\nLLVM")
        );
    }

    #[test]
    fn test_fallback_selector() {
        let html = r#"<div class="description__text"><div class="show-more-less-html">  </div></div>
            <div class="show-more-less-html__markup">Fallback text</div>"#;
        assert_eq!(extract_description(html).as_deref(), Some("Fallback text"));
    }

    #[test]
    fn test_both_selectors_empty() {
        assert_eq!(extract_description("<html><body><p>Sign in</p></body></html>"), None);
    }

    /// Detail pages where `/slow` hangs before failing.
    struct SlowFailure {
        started: Mutex<Vec<(String, Duration)>>,
        origin: tokio::time::Instant,
    }

    #[async_trait]
    impl PageFetcher for SlowFailure {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.started
                .lock()
                .unwrap()
                .push((url.to_string(), self.origin.elapsed()));
            if url.ends_with("/slow") {
                tokio::time::sleep(Duration::from_secs(10)).await;
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: 504,
                });
            }
            Ok(r#"<div class="show-more-less-html__markup">Fine</div>"#.to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_failure_does_not_delay_others() {
        let fetcher = Arc::new(SlowFailure {
            started: Mutex::new(Vec::new()),
            origin: tokio::time::Instant::now(),
        });
        let enricher = DescriptionEnricher::new(fetcher.clone()).with_concurrency(2);

        let records = ["a", "slow", "c", "d"]
            .iter()
            .map(|id| JobRecord {
                position: id.to_string(),
                job_url: format!("https://jobs.example.com/{}", id),
                ..Default::default()
            })
            .collect();
        let enriched = enricher.enrich(records).await;

        let started = fetcher.started.lock().unwrap();
        assert_eq!(started.len(), 4);
        for (url, at) in started.iter() {
            assert_eq!(*at, Duration::ZERO, "{} started late", url);
        }

        let positions: Vec<_> = enriched.iter().map(|r| r.position.as_str()).collect();
        assert_eq!(positions, vec!["a", "slow", "c", "d"]);
        assert_eq!(enriched[1].description.as_deref(), Some(DESCRIPTION_NOT_AVAILABLE));
        assert_eq!(enriched[3].description.as_deref(), Some("Fine"));
    }

    #[tokio::test]
    async fn test_empty_page_yields_sentinel() {
        let (enricher, _) = enricher(&[("https://jobs.example.com/1", "<p>nothing here</p>")]);
        assert_eq!(
            enricher.fetch_description("https://jobs.example.com/1").await,
            DESCRIPTION_NOT_AVAILABLE
        );
    }

    #[tokio::test]
    async fn test_failures_are_independent() {
        let (enricher, fetcher) = enricher(&[
            (
                "https://jobs.example.com/1",
                r#"<div class="show-more-less-html__markup">First</div>"#,
            ),
            (
                "https://jobs.example.com/3",
                r#"<div class="show-more-less-html__markup">Third</div>"#,
            ),
        ]);

        let records = ["1", "2", "3"]
            .iter()
            .map(|id| JobRecord {
                position: format!("Job {}", id),
                job_url: format!("https://jobs.example.com/{}", id),
                ..Default::default()
            })
            .chain(std::iter::once(JobRecord {
                position: "No link".to_string(),
                ..Default::default()
            }))
            .collect();

        let enriched = enricher.with_concurrency(2).enrich(records).await;

        let descriptions: Vec<_> = enriched
            .iter()
            .map(|r| r.description.clone().unwrap())
            .collect();
        assert_eq!(
            descriptions,
            vec!["First", DESCRIPTION_NOT_AVAILABLE, "Third", DESCRIPTION_NOT_AVAILABLE]
        );
        // The record without a URL is never fetched.
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }
}
