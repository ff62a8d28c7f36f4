//! HTTP API serving cached job searches.
//!
//! - `GET /` returns an operational status string
//! - `GET /jobs` runs (or replays from cache) a search and returns JSON

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cache::spawn_sweeper;
use crate::config::Settings;
use crate::harvester::Harvester;
use crate::models::SearchRequest;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub harvester: Arc<Harvester>,
    /// Filled into `/jobs` requests that leave parameters out.
    pub defaults: Arc<SearchRequest>,
}

impl AppState {
    pub fn new(harvester: Arc<Harvester>, defaults: SearchRequest) -> Self {
        Self {
            harvester,
            defaults: Arc::new(defaults),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let harvester = Harvester::from_settings(settings)?;
        Ok(Self::new(Arc::new(harvester), settings.defaults.clone()))
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;
    let sweeper = spawn_sweeper(state.harvester.cache().clone(), settings.sweep_interval);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let result = axum::serve(listener, app).await;

    sweeper.abort();
    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::scrapers::pagination::tests::{Script, Step};

    fn setup_test_app(steps: Vec<Step>) -> (axum::Router, Arc<Script>) {
        let script = Script::new(steps);
        let settings = Settings {
            search_url: "https://jobs.example.com/search".to_string(),
            ..Default::default()
        };
        let harvester = Harvester::with_fetcher(&settings, script.clone()).unwrap();
        let state = AppState::new(Arc::new(harvester), settings.defaults.clone());
        (create_router(state), script)
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root_status() {
        let (app, _) = setup_test_app(vec![]);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("running"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_returns_records() {
        let (app, script) = setup_test_app(vec![Step::Page(25, 0)]);
        let (status, json) =
            get_json(app, "/jobs?keyword=rust&location=Berlin&limit=3&sortBy=recent").await;

        assert_eq!(status, StatusCode::OK);
        let jobs = json.as_array().unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0]["position"], "Engineer 0");
        assert_eq!(jobs[0]["company"], "Acme");
        assert_eq!(jobs[0]["postedDate"], "2024-11-03");
        assert!(jobs[0].get("jobUrl").is_some());

        let url = script.urls.lock().unwrap()[0].clone();
        assert!(url.contains("keywords=rust&location=Berlin"));
        assert!(url.ends_with("start=0&sortBy=DD"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_uses_defaults() {
        let (app, script) = setup_test_app(vec![Step::Page(25, 0)]);
        let (status, json) = get_json(app, "/jobs").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 25);

        let url = script.urls.lock().unwrap()[0].clone();
        assert!(url.contains("keywords=software%20engineer&location=United%20States"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_empty_result_is_ok() {
        let (app, _) = setup_test_app(vec![Step::Page(0, 0)]);
        let (status, json) = get_json(app, "/jobs?keyword=cobol").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }
}
