//! Transport abstraction used by the source adapters.
//!
//! Adapters only see [`HttpClient`]; production wires [`ReqwestHttpClient`],
//! tests wire [`StubHttpClient`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// HTTP request envelope built by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failure: the request never produced a status line + body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Send a GET and return `(status, body)`, or a transport error.
/// Implementations enforce their own bounded timeout.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout.min(Duration::from_secs(4)))
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Request(format!("building http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(e.to_string())
            } else if e.is_connect() {
                HttpError::Connect(e.to_string())
            } else {
                HttpError::Request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::Body(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// Canned transport for offline runs and tests.
///
/// Routes are matched by URL prefix in insertion order; unmatched URLs fail
/// with [`HttpError::Connect`]. Every call is counted and its request kept.
#[derive(Debug, Default, Clone)]
pub struct StubHttpClient {
    routes: Arc<Mutex<Vec<(String, Result<HttpResponse, HttpError>)>>>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
    calls: Arc<AtomicUsize>,
}

impl StubHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose URL starts with `prefix` with `response`.
    pub fn route(self, prefix: impl Into<String>, response: HttpResponse) -> Self {
        self.set_route(prefix, Ok(response));
        self
    }

    /// Fail requests whose URL starts with `prefix` with `error`.
    pub fn fail(self, prefix: impl Into<String>, error: HttpError) -> Self {
        self.set_route(prefix, Err(error));
        self
    }

    /// Replace (or add) the outcome for `prefix`.
    pub fn set_route(&self, prefix: impl Into<String>, outcome: Result<HttpResponse, HttpError>) {
        let prefix = prefix.into();
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        match routes.iter_mut().find(|(p, _)| *p == prefix) {
            Some(slot) => slot.1 = outcome,
            None => routes.push((prefix, outcome)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls whose URL starts with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.url.starts_with(prefix))
            .count()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
            .map(|(_, outcome)| outcome.clone());
        let url = request.url.clone();
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        outcome.unwrap_or_else(|| Err(HttpError::Connect(format!("no stub route for {url}"))))
    }
}
