//! Client for the upstream product API.
//!
//! Every call is a single `GET` bounded by a hard timeout (10 seconds by
//! default). Outcomes are normalized into [`UpstreamResponse`] or
//! [`UpstreamError`]:
//!
//! | outcome | status | `is_abort` | message |
//! |---|---|---|---|
//! | non-2xx response | upstream status | `false` | `Upstream request failed` |
//! | timeout | 504 | `true` | `Upstream request timed out` |
//! | transport / decode failure | 502 | `false` | `Upstream request error` |
//!
//! The timeout wraps the whole exchange (connect, headers, body), and the timer
//! is dropped together with the future on every exit path.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

/// Default bound on a single upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Header carrying the upstream API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Successful upstream payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// Parsed JSON, or the raw text wrapped in `Value::String`.
    pub body: Value,
    /// Whether the response declared a JSON content type.
    pub is_json: bool,
}

/// Structured failure from the upstream service or the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct UpstreamError {
    /// HTTP status to report: the upstream status, or 502/504.
    pub status: u16,
    /// Human-readable summary.
    pub message: String,
    /// Set when the call was cancelled by the timeout.
    pub is_abort: bool,
    /// Error payload returned by the upstream service, if any.
    pub body: Option<Value>,
}

impl UpstreamError {
    /// Upstream answered with a non-success status.
    #[must_use]
    pub fn failed(status: u16, body: Value) -> Self {
        Self {
            status,
            message: "Upstream request failed".to_string(),
            is_abort: false,
            body: Some(body),
        }
    }

    /// The call exceeded the timeout.
    #[must_use]
    pub fn timed_out() -> Self {
        Self {
            status: 504,
            message: "Upstream request timed out".to_string(),
            is_abort: true,
            body: None,
        }
    }

    /// Network or decode failure.
    #[must_use]
    pub fn transport() -> Self {
        Self {
            status: 502,
            message: "Upstream request error".to_string(),
            is_abort: false,
            body: None,
        }
    }

    fn from_reqwest(err: &reqwest::Error) -> Self {
        debug!(error = %err, "Upstream transport failure");
        if err.is_timeout() {
            Self::timed_out()
        } else {
            Self::transport()
        }
    }
}

/// HTTP client for the upstream product API.
///
/// Cheaply cloneable; clones share the connection pool.
#[derive(Clone)]
pub struct UpstreamClient {
    inner: Arc<UpstreamClientInner>,
}

struct UpstreamClientInner {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl UpstreamClient {
    /// Create a client with the default 10 second timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(UpstreamClientInner {
                client: reqwest::Client::new(),
                timeout,
            }),
        }
    }

    /// Timeout applied to every call.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Fetch `url`, authenticating with `api_key`.
    ///
    /// `label` only appears in logs.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` on a non-success status, timeout, or transport
    /// failure. Every failure is logged before it is returned.
    #[instrument(skip(self, url, api_key), fields(url = %url))]
    pub async fn fetch(
        &self,
        url: &Url,
        api_key: &SecretString,
        label: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let result = tokio::time::timeout(self.inner.timeout, self.send(url, api_key))
            .await
            .unwrap_or_else(|_elapsed| Err(UpstreamError::timed_out()));

        if let Err(err) = &result {
            error!(
                endpoint = label,
                is_abort = err.is_abort,
                status = err.status,
                error = %err.message,
                timestamp = %chrono::Utc::now().to_rfc3339(),
                "{label} API error"
            );
        }

        result
    }

    async fn send(&self, url: &Url, api_key: &SecretString) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .inner
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, api_key.expose_secret())
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&e))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let body = if is_json {
            response.json::<Value>().await
        } else {
            response.text().await.map(Value::String)
        }
        .map_err(|e| UpstreamError::from_reqwest(&e))?;

        if !status.is_success() {
            return Err(UpstreamError::failed(status.as_u16(), body));
        }

        Ok(UpstreamResponse { body, is_json })
    }
}
