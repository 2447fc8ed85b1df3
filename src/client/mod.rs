pub mod error;
pub mod holidays;
pub mod profiles;

use std::time::Duration;

use futures::future::{AbortRegistration, Abortable};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
pub use error::ApiError;

/// Per-call overrides for [`UpstreamClient::send`].
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    /// Cancels the request when the paired `AbortHandle` fires.
    pub abort: Option<AbortRegistration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout), abort: None }
    }
}

/// HTTP client for the HR backend REST API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    default_timeout: Duration,
    probe_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(
        base_url: impl Into<String>,
        default_timeout: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_timeout,
            probe_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.upstream_base_url, config.request_timeout(), config.probe_timeout())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Sends `request`, bounded by the timeout and abort in `options`.
    /// Non-2xx responses become [`ApiError::Status`] with the body text.
    pub async fn send(
        &self,
        request: RequestBuilder,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let request = request.build().map_err(|e| ApiError::Request(e.to_string()))?;
        let url = request.url().to_string();
        let after = options.timeout.unwrap_or(self.default_timeout);

        debug!(
            method = %request.method(),
            url = %url,
            timeout_ms = after.as_millis() as u64,
            "Upstream request"
        );

        let call = tokio::time::timeout(after, self.http.execute(request));
        let outcome = match options.abort {
            Some(registration) => Abortable::new(call, registration)
                .await
                .map_err(|_| ApiError::Aborted { url: url.clone() })?,
            None => call.await,
        };

        let response = outcome
            .map_err(|_| ApiError::Timeout {
                url: url.clone(),
                after_ms: after.as_millis() as u64,
            })?
            .map_err(|e| ApiError::from_reqwest(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), body = %body, "Upstream returned an error");
            return Err(ApiError::Status { status: status.as_u16(), body });
        }

        Ok(response)
    }

    pub(crate) async fn json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.send(request, options).await?;
        let url = response.url().to_string();
        response.json::<T>().await.map_err(|e| ApiError::Decode { url, reason: e.to_string() })
    }

    /// Reachability check used before holiday writes and listings.
    pub async fn probe(&self) -> Result<(), ApiError> {
        let request = self.http.get(self.url(holidays::ALL_PATH));
        self.send(request, RequestOptions::with_timeout(self.probe_timeout)).await.map(|_| ())
    }
}
