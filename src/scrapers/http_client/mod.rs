//! HTTP client with browser-like identity and request jitter.

mod user_agent;

pub use user_agent::{UserAgentPool, BROWSER_USER_AGENTS};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{random_delay, PageFetcher};
use crate::error::{FetchError, HarvestError};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";
const ACCEPT_ENCODING_VALUE: &str = "gzip, deflate, br";

/// Timing applied to every outbound request.
#[derive(Debug, Clone)]
pub struct RequestPolicy {
    /// Hard per-request timeout.
    pub timeout: Duration,
    /// Lower bound of the pre-request delay.
    pub min_delay: Duration,
    /// Upper bound (exclusive) of the pre-request delay.
    pub max_delay: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            min_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(4000),
        }
    }
}

/// Outbound request dispatcher.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    policy: RequestPolicy,
    user_agents: UserAgentPool,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(policy: RequestPolicy) -> Result<Self, HarvestError> {
        Self::with_user_agents(policy, UserAgentPool::default())
    }

    /// Create a new HTTP client drawing identities from `user_agents`.
    pub fn with_user_agents(
        policy: RequestPolicy,
        user_agents: UserAgentPool,
    ) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .timeout(policy.timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| HarvestError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            policy,
            user_agents,
        })
    }

    /// GET a page body as text after a jittered delay.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let delay = random_delay(self.policy.min_delay, self.policy.max_delay);
        tokio::time::sleep(delay).await;

        let request = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agents.pick())
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .header(ACCEPT_ENCODING, ACCEPT_ENCODING_VALUE)
            .header(CONNECTION, "keep-alive");

        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!(
            url,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "GET"
        );

        check_status(url, status)?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.get_text(url).await
    }
}

/// Map a response status onto the fetch error taxonomy.
pub fn check_status(url: &str, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Err(FetchError::RateLimited {
            url: url.to_string(),
        })
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}
