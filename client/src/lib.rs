//! HTTP collaborators for Reframe.
//!
//! Two thin request/response clients over `reqwest`:
//!
//! - [`GenerationClient`] - posts `{window_id, problem, ideas}` to the
//!   assistance backend's `prompt_llm` endpoint and parses `{text?}`.
//! - [`ProblemClient`] - fetches the ordered `{id, text}` problem records the
//!   session displays.
//!
//! Both are read-only from the session's point of view: the session core
//! treats every failure here as recoverable and never blocks on one.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use reframe_types::{GenerateRequest, GenerateResponse, Problem};

/// Backend the study runs against when nothing is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Path of the generation endpoint on the backend.
pub const GENERATE_PATH: &str = "prompt_llm";

const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default bound on a single generation round trip. A stalled call would
/// otherwise hold the session-wide generation lock indefinitely.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body = if body.len() > MAX_ERROR_BODY_BYTES {
        String::from_utf8_lossy(&body.as_bytes()[..MAX_ERROR_BODY_BYTES]).into_owned()
    } else {
        body
    };
    Err(ClientError::Status { status, body })
}

/// Client for the text-generation backend.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GenerationClient {
    /// Build a client against `base_url` with a bounded request timeout.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ClientError> {
        // Url::join treats a path without a trailing slash as a file; make
        // "http://host/api" and "http://host/api/" resolve the same way.
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            http: build_http_client(timeout)?,
            endpoint: base.join(GENERATE_PATH)?,
        })
    }

    /// Issue one generation request and parse the response body.
    ///
    /// Transport failures, non-2xx statuses, and malformed bodies all surface
    /// as [`ClientError`]; the caller decides how soft the failure is.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ClientError> {
        tracing::debug!(window = %request.window_id, "dispatching generation request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Client for the read-only problem source.
#[derive(Debug, Clone)]
pub struct ProblemClient {
    http: reqwest::Client,
    url: Url,
    api_key: Option<String>,
}

impl ProblemClient {
    pub fn new(url: Url, api_key: Option<String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            url,
            api_key,
        })
    }

    /// Fetch all problem records, sorted by ascending id.
    ///
    /// The session consumes only the first record; sorting here keeps that
    /// choice independent of server-side ordering.
    pub async fn fetch(&self) -> Result<Vec<Problem>, ClientError> {
        let mut request = self.http.get(self.url.clone());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = check_status(request.send().await?).await?;
        let mut problems: Vec<Problem> = response.json().await?;
        problems.sort_by_key(|p| p.id);
        tracing::debug!(count = problems.len(), "fetched problem records");
        Ok(problems)
    }
}
