//! Transport seam between the client and the network
//!
//! Every operation is one POST of a JSON command list to the same endpoint.

use crate::config::ClientConfig;
use crate::error::{FiberyError, FiberyResult, TransportError};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Raw result of one HTTP call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body text
    pub body: String,
}

impl RemoteResponse {
    /// Create response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse body as JSON
    pub fn json(&self) -> FiberyResult<Value> {
        serde_json::from_str(&self.body).map_err(FiberyError::malformed)
    }

    /// Fail with `Api` unless the status is 2xx
    pub fn require_success(self) -> FiberyResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FiberyError::status(self.status, &self.body))
        }
    }
}

/// Sends one command list and returns the raw response
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// POST `payload` to the commands endpoint
    async fn post(&self, payload: &Value) -> Result<RemoteResponse, TransportError>;
}

/// `reqwest` transport with token authentication
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    url: String,
    token: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Build transport; the HTTP client is created once here
    pub fn new(config: &ClientConfig) -> FiberyResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FiberyError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            url: config.base_url.clone(),
            token: config.token.clone(),
            timeout: config.timeout,
        })
    }

    /// Endpoint this transport posts to
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            TransportError::Send(err.to_string())
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post(&self, payload: &Value) -> Result<RemoteResponse, TransportError> {
        let response = self
            .http
            .post(&self.url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(&e))?;
        tracing::trace!(status, bytes = body.len(), "fibery response");

        Ok(RemoteResponse { status, body })
    }
}
