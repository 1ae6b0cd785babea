use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use http_body_util::BodyExt;
use jobwatch::config::AppConfig;
use jobwatch::db;
use jobwatch::error::AppError;
use jobwatch::extract::{JobCandidate, JobExtractor};
use jobwatch::fetch::{FetchedPage, PageFetcher};
use jobwatch::routes;
use jobwatch::state::AppState;
use serde::Serialize;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::util::ServiceExt;
use url::Url;

/// Serves canned clean text for seeded URLs; anything else fails the way a
/// dead link would.
#[derive(Default)]
pub struct FakeFetcher {
    pages: Mutex<HashMap<String, String>>,
}

impl FakeFetcher {
    pub async fn seed_page(&self, url: &str, clean_text: &str) {
        let mut guard = self.pages.lock().await;
        guard.insert(url.to_string(), clean_text.to_string());
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AppError> {
        let guard = self.pages.lock().await;
        match guard.get(url.as_str()) {
            Some(clean_text) => Ok(FetchedPage {
                clean_text: clean_text.clone(),
                final_url: url.to_string(),
            }),
            None => Err(AppError::FetchFailed {
                status: Some(404),
                cause: format!("no seeded page for {url}"),
            }),
        }
    }
}

/// Replays scripted extraction outcomes in order.
#[derive(Default)]
pub struct FakeExtractor {
    responses: Mutex<VecDeque<Result<JobCandidate, AppError>>>,
}

impl FakeExtractor {
    pub async fn script(&self, response: Result<JobCandidate, AppError>) {
        let mut guard = self.responses.lock().await;
        guard.push_back(response);
    }
}

#[async_trait]
impl JobExtractor for FakeExtractor {
    async fn extract(
        &self,
        _clean_text: &str,
        _source_url: &str,
    ) -> Result<JobCandidate, AppError> {
        let mut guard = self.responses.lock().await;
        guard.pop_front().unwrap_or_else(|| {
            Err(AppError::ExtractionUnavailable(
                "no scripted extraction response".to_string(),
            ))
        })
    }
}

#[allow(dead_code)]
pub fn sample_candidate(url: &str) -> JobCandidate {
    JobCandidate {
        company_name: "Acme Ltd".to_string(),
        position_title: "Platform Engineer".to_string(),
        job_url: url.to_string(),
        location: Some("Leeds".to_string()),
        salary: Some("£60,000".to_string()),
        description: Some("Build and run the platform.".to_string()),
        requirements: Some("Rust, SQL".to_string()),
        clean_text_content: Some("Acme Ltd is hiring a Platform Engineer.".to_string()),
        ai_advice: Some("Lead with infrastructure experience.".to_string()),
        application_deadline: None,
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
    fetcher: Arc<FakeFetcher>,
    extractor: Arc<FakeExtractor>,
    _db_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let db_dir = tempfile::tempdir()?;
        let database_url = db_dir
            .path()
            .join("jobwatch-test.db")
            .to_string_lossy()
            .into_owned();

        let config = AppConfig {
            database_url: database_url.clone(),
            database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_allowed_origin: None,
            openai_api_key: "test-key".to_string(),
            openai_model: "test-model".to_string(),
            extract_timeout_secs: 5,
            fetch_timeout_secs: 5,
            fetch_max_redirects: 5,
        };

        let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
        db::run_migrations(&pool)?;

        let fetcher = Arc::new(FakeFetcher::default());
        let extractor = Arc::new(FakeExtractor::default());
        let state = AppState::new(
            pool,
            config,
            fetcher.clone() as Arc<dyn PageFetcher>,
            extractor.clone() as Arc<dyn JobExtractor>,
        );
        let router = routes::create_router(state.clone());

        Ok(Self {
            state,
            router,
            fetcher,
            extractor,
            _db_dir: db_dir,
        })
    }

    #[allow(dead_code)]
    pub fn fetcher(&self) -> Arc<FakeFetcher> {
        self.fetcher.clone()
    }

    #[allow(dead_code)]
    pub fn extractor(&self) -> Arc<FakeExtractor> {
        self.extractor.clone()
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::POST, path, payload).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PATCH, path, payload).await
    }

    #[allow(dead_code)]
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PUT, path, payload).await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn get(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn delete(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    Ok(body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read body: {err}"))?
        .to_bytes()
        .to_vec())
}

#[allow(dead_code)]
pub async fn json_body<T: serde::de::DeserializeOwned>(
    response: hyper::Response<Body>,
) -> Result<T> {
    let bytes = body_to_vec(response.into_body()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
