//! Authenticated request execution.

use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use sheetsync_core::{SheetsError, SheetsResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Performs authenticated requests against the remote API.
///
/// Paths are relative to the API root (e.g. `/spreadsheets/abc`). Both calls
/// return the raw response body; interpreting it, including the in-body error
/// envelope, is up to the caller. Only failures below the JSON layer are
/// reported as errors.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Issue a GET request.
    async fn get(&self, path: &str) -> SheetsResult<Vec<u8>>;

    /// Issue a POST request with a JSON body.
    async fn post(&self, path: &str, body: &serde_json::Value) -> SheetsResult<Vec<u8>>;
}

#[async_trait]
impl<E: RequestExecutor + ?Sized> RequestExecutor for Arc<E> {
    async fn get(&self, path: &str) -> SheetsResult<Vec<u8>> {
        (**self).get(path).await
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> SheetsResult<Vec<u8>> {
        (**self).post(path, body).await
    }
}

/// `RequestExecutor` over a `reqwest` client with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    base_url: String,
}

impl HttpExecutor {
    /// Constructs an executor from configuration.
    ///
    /// The token, when present, is sent as `Authorization: Bearer <token>` on
    /// every request. System proxy lookup is disabled.
    ///
    /// # Errors
    ///
    /// Returns `SheetsError::Config` if the token is not a valid header value
    /// or the underlying client cannot be built.
    pub fn new(config: &ClientConfig) -> SheetsResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| SheetsError::Config(format!("invalid access token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .no_proxy()
            .build()
            .map_err(|e| SheetsError::Config(e.to_string()))?;

        Ok(Self::with_client(client, config.trimmed_base_url()))
    }

    /// Wrap an already-configured client, e.g. one carrying its own auth
    /// middleware.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read(response: reqwest::Response) -> SheetsResult<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                url = %response.url(),
                "non-success HTTP status; deferring to response body"
            );
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| SheetsError::Transport(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn get(&self, path: &str) -> SheetsResult<Vec<u8>> {
        debug!(method = "GET", path, "sending request");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| SheetsError::Transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> SheetsResult<Vec<u8>> {
        debug!(method = "POST", path, "sending request");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| SheetsError::Transport(e.to_string()))?;
        Self::read(response).await
    }
}
