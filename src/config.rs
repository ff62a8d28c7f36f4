//! Configuration management for jobharvest using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CacheKey;
use crate::error::HarvestError;
use crate::harvester::Preset;
use crate::models::SearchRequest;
use crate::query::SEARCH_URL;
use crate::scrapers::description::DEFAULT_CONCURRENCY;
use crate::scrapers::{RequestPolicy, RetryPolicy};

/// Default server bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

/// Default interval between cache sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Application settings.
///
/// `retry_policy`, `cache_key`, `cache_ttl`, and `enrich_descriptions` are
/// overrides; when unset the value comes from `preset`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP server listens on.
    pub bind: String,
    /// Guest search endpoint.
    pub search_url: String,
    pub preset: Preset,
    pub retry_policy: Option<RetryPolicy>,
    pub cache_key: Option<CacheKey>,
    pub cache_ttl: Option<Duration>,
    /// How often expired cache entries are evicted.
    pub sweep_interval: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Pre-request jitter window in milliseconds.
    pub request_delay_min_ms: u64,
    pub request_delay_max_ms: u64,
    pub enrich_descriptions: Option<bool>,
    /// Detail pages fetched at once when enriching.
    pub enrich_concurrency: usize,
    /// Custom user agent pool; empty means the built-in list.
    pub user_agents: Vec<String>,
    /// Values used for `/jobs` parameters the caller leaves out.
    pub defaults: SearchRequest,
}

impl Default for Settings {
    fn default() -> Self {
        let request = RequestPolicy::default();
        Self {
            bind: DEFAULT_BIND.to_string(),
            search_url: SEARCH_URL.to_string(),
            preset: Preset::default(),
            retry_policy: None,
            cache_key: None,
            cache_ttl: None,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            request_timeout: request.timeout,
            request_delay_min_ms: request.min_delay.as_millis() as u64,
            request_delay_max_ms: request.max_delay.as_millis() as u64,
            enrich_descriptions: None,
            enrich_concurrency: DEFAULT_CONCURRENCY,
            user_agents: Vec::new(),
            defaults: default_search_request(),
        }
    }
}

fn default_search_request() -> SearchRequest {
    SearchRequest {
        keyword: Some("software engineer".to_string()),
        location: Some("United States".to_string()),
        limit: Some(25),
        ..Default::default()
    }
}

impl Settings {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
            .clone()
            .unwrap_or_else(|| self.preset.retry_policy())
    }

    pub fn cache_key(&self) -> CacheKey {
        self.cache_key.unwrap_or_else(|| self.preset.cache_key())
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl.unwrap_or_else(|| self.preset.cache_ttl())
    }

    pub fn enrich_descriptions(&self) -> bool {
        self.enrich_descriptions
            .unwrap_or_else(|| self.preset.enrich_descriptions())
    }

    pub fn request_policy(&self) -> RequestPolicy {
        RequestPolicy {
            timeout: self.request_timeout,
            min_delay: Duration::from_millis(self.request_delay_min_ms),
            max_delay: Duration::from_millis(self.request_delay_max_ms),
        }
    }

    /// Apply `JOBHARVEST_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), HarvestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(bind) = var("JOBHARVEST_BIND") {
            tracing::debug!("Using JOBHARVEST_BIND from environment: {}", bind);
            self.bind = bind;
        }
        if let Some(preset) = var("JOBHARVEST_PRESET") {
            self.preset = parse_preset(&preset)?;
        }
        if let Some(ttl) = var("JOBHARVEST_CACHE_TTL_SECS") {
            let secs = ttl.trim().parse::<u64>().map_err(|_| {
                HarvestError::Config(format!("JOBHARVEST_CACHE_TTL_SECS is not a number: {}", ttl))
            })?;
            self.cache_ttl = Some(Duration::from_secs(secs));
        }
        if let Some(url) = var("JOBHARVEST_SEARCH_URL") {
            tracing::debug!("Using JOBHARVEST_SEARCH_URL from environment: {}", url);
            self.search_url = url;
        }
        Ok(())
    }
}

fn parse_preset(name: &str) -> Result<Preset, HarvestError> {
    Preset::parse(name).ok_or_else(|| HarvestError::Config(format!("Unknown preset: {}", name)))
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
    /// `simple` or `batch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// `bounded-attempt` or `consecutive-error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<String>,
    /// `canonical-url` or `keyword-location`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep_interval_secs: Option<u64>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_min_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_max_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrich_descriptions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrich_concurrency: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_agents: Vec<String>,
    /// Search defaults, using the same camelCase keys as `/jobs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<SearchRequest>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers jobharvest config files in standard locations.
    pub async fn load() -> Result<Self, HarvestError> {
        match prefer::load("jobharvest").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default()),
            },
            // No config file found
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, HarvestError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            HarvestError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| HarvestError::Config(format!("Failed to parse TOML config: {}", e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| HarvestError::Config(format!("Failed to parse YAML config: {}", e)))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| HarvestError::Config(format!("Failed to parse JSON config: {}", e)))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) -> Result<(), HarvestError> {
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(ref url) = self.search_url {
            settings.search_url = url.clone();
        }
        if let Some(ref preset) = self.preset {
            settings.preset = parse_preset(preset)?;
        }
        if let Some(ref name) = self.retry_policy {
            let policy = RetryPolicy::from_name(name).ok_or_else(|| {
                HarvestError::Config(format!("Unknown retry policy: {}", name))
            })?;
            settings.retry_policy = Some(policy);
        }
        if let Some(ref name) = self.cache_key {
            let key = CacheKey::parse(name)
                .ok_or_else(|| HarvestError::Config(format!("Unknown cache key scheme: {}", name)))?;
            settings.cache_key = Some(key);
        }
        if let Some(ttl) = self.cache_ttl_secs {
            settings.cache_ttl = Some(Duration::from_secs(ttl));
        }
        if let Some(interval) = self.sweep_interval_secs {
            settings.sweep_interval = Duration::from_secs(interval.max(1));
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = Duration::from_secs(timeout);
        }
        if let Some(min) = self.request_delay_min_ms {
            settings.request_delay_min_ms = min;
        }
        if let Some(max) = self.request_delay_max_ms {
            settings.request_delay_max_ms = max;
        }
        if let Some(enrich) = self.enrich_descriptions {
            settings.enrich_descriptions = Some(enrich);
        }
        if let Some(concurrency) = self.enrich_concurrency {
            settings.enrich_concurrency = concurrency.max(1);
        }
        if !self.user_agents.is_empty() {
            settings.user_agents = self.user_agents.clone();
        }
        if let Some(ref defaults) = self.defaults {
            settings.defaults = defaults.clone().or(&settings.defaults);
        }
        Ok(())
    }
}

/// Load settings from an explicit config file, or discover one.
/// Environment variables take precedence over the file.
pub async fn load_settings(config_path: Option<&Path>) -> Result<(Settings, Config), HarvestError> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path).await?,
        None => Config::load().await?,
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings)?;
    settings.apply_env_overrides(|name| std::env::var(name).ok())?;

    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_follow_batch_preset() {
        let settings = Settings::default();
        assert_eq!(settings.preset, Preset::Batch);
        assert_eq!(settings.retry_policy(), RetryPolicy::consecutive_error());
        assert_eq!(settings.cache_key(), CacheKey::CanonicalUrl);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(3600));
        assert!(!settings.enrich_descriptions());
        assert_eq!(settings.defaults.keyword.as_deref(), Some("software engineer"));
        assert_eq!(settings.defaults.location.as_deref(), Some("United States"));
        assert_eq!(settings.defaults.limit, Some(25));
    }

    #[tokio::test]
    async fn test_load_toml() {
        let file = write_config(
            ".toml",
            r#"
bind = "0.0.0.0:8080"
preset = "simple"
cache_ttl_secs = 120
user_agents = ["TestAgent/1.0"]

[defaults]
keyword = "rust developer"
"#,
        );

        let config = Config::load_from_path(file.path()).await.unwrap();
        assert_eq!(config.source_path.as_deref(), Some(file.path()));

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings).unwrap();

        assert_eq!(settings.bind, "0.0.0.0:8080");
        assert_eq!(settings.preset, Preset::Simple);
        assert_eq!(settings.retry_policy(), RetryPolicy::bounded_attempt());
        assert_eq!(settings.cache_key(), CacheKey::KeywordLocation);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(120));
        assert!(settings.enrich_descriptions());
        assert_eq!(settings.user_agents, vec!["TestAgent/1.0"]);
        assert_eq!(settings.defaults.keyword.as_deref(), Some("rust developer"));
        // Unset defaults keep their built-in values.
        assert_eq!(settings.defaults.location.as_deref(), Some("United States"));
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let yaml = write_config(".yaml", "retry_policy: bounded-attempt\nenrich_concurrency: 2\n");
        let config = Config::load_from_path(yaml.path()).await.unwrap();
        assert_eq!(config.retry_policy.as_deref(), Some("bounded-attempt"));
        assert_eq!(config.enrich_concurrency, Some(2));

        let json = write_config(".json", r#"{"cache_key": "keyword-location"}"#);
        let config = Config::load_from_path(json.path()).await.unwrap();
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings).unwrap();
        assert_eq!(settings.cache_key(), CacheKey::KeywordLocation);
        // Preset still supplies the rest.
        assert_eq!(settings.retry_policy(), RetryPolicy::consecutive_error());
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let file = write_config(".toml", "bind = [");
        let err = Config::load_from_path(file.path()).await.unwrap_err();
        assert!(matches!(err, HarvestError::Config(_)));
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let mut settings = Settings::default();
        let config = Config {
            preset: Some("turbo".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.apply_to_settings(&mut settings),
            Err(HarvestError::Config(_))
        ));

        let config = Config {
            cache_key: Some("hash".to_string()),
            ..Default::default()
        };
        assert!(config.apply_to_settings(&mut settings).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("JOBHARVEST_BIND", "0.0.0.0:9000"),
            ("JOBHARVEST_PRESET", "simple"),
            ("JOBHARVEST_CACHE_TTL_SECS", "90"),
            ("JOBHARVEST_SEARCH_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_env_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.bind, "0.0.0.0:9000");
        assert_eq!(settings.preset, Preset::Simple);
        assert_eq!(settings.cache_ttl(), Duration::from_secs(90));
        // Empty values are ignored.
        assert_eq!(settings.search_url, SEARCH_URL);
    }

    #[test]
    fn test_env_ttl_must_be_numeric() {
        let mut settings = Settings::default();
        let result = settings.apply_env_overrides(|name| {
            (name == "JOBHARVEST_CACHE_TTL_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(HarvestError::Config(_))));
    }
}
