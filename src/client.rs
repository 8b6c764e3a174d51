//! HTTP client for the coordinator's query list endpoint.
//!
//! The coordinator returns the complete current query collection on every
//! call; there is no delta protocol. A failed call is a terminal outcome for
//! that refresh cycle only - the regular poll cadence is the retry mechanism.

use std::time::Duration;

use thiserror::Error;

use crate::models::QueryInfo;

/// Errors surfaced by [`CoordinatorClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a usable response (connect, timeout,
    /// or body decode failure).
    #[error("coordinator request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The coordinator answered with a non-success status.
    #[error("coordinator returned HTTP {status}")]
    Status { status: u16 },
}

/// Client for a Presto-compatible coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorClient {
    base_url: String,
    http: reqwest::Client,
}

impl CoordinatorClient {
    /// Create a client for the given coordinator base URL.
    ///
    /// A trailing slash on the base URL is tolerated. The timeout bounds the
    /// whole request; the poll loop treats a timeout like any other
    /// transport failure.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Fetch the full current query collection.
    pub async fn fetch_queries(&self) -> Result<Vec<QueryInfo>, ClientError> {
        let url = format!("{}/v1/query", self.base_url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }

        let queries = response.json::<Vec<QueryInfo>>().await?;
        tracing::debug!(count = queries.len(), "fetched query snapshot");
        Ok(queries)
    }

    /// The configured base URL (for status-line display).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
