//! HTTP implementation of [`RelatedFetcher`].
//!
//! Routes are joined onto the configured base URL and fetched with `GET`.
//! A 404 means the relation does not exist; transient failures are retried
//! with exponential backoff until the expansion is cancelled.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::config::FetcherConfig;
use crate::error::{FetchError, FetchResult};
use crate::fetcher::RelatedFetcher;
use crate::retry::{with_retry_if, RetryConfig};

/// Fetches related entities from a REST API.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetcherConfig,
    retry: RetryConfig,
}

impl HttpFetcher {
    /// Create a fetcher.
    ///
    /// # Errors
    ///
    /// [`FetchError::RequestFailed`] if the HTTP client cannot be built.
    pub fn new(config: FetcherConfig) -> FetchResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let retry = config.retry_config();

        Ok(Self {
            client,
            config,
            retry,
        })
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    async fn get_once(&self, url: &str) -> FetchResult<Option<Value>> {
        let mut request = self.client.get(url);

        if let Some(ref api_key) = self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response(response: reqwest::Response) -> FetchResult<Option<Value>> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<Value>().await {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(FetchError::InvalidResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl RelatedFetcher for HttpFetcher {
    #[instrument(skip(self, cancel), fields(base_url = %self.config.base_url))]
    async fn fetch_related(
        &self,
        route: &str,
        parent_id: &str,
        cancel: &CancellationToken,
    ) -> FetchResult<Option<Value>> {
        let url = self.config.url(route);
        debug!(url = %url, "Fetching related entity");

        let attempts = with_retry_if(&self.retry, || self.get_once(&url), FetchError::is_retryable);

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(url = %url, "Related fetch cancelled");
                Err(FetchError::Cancelled)
            }
            result = attempts => result,
        }
    }
}
