//! Thin wrapper over reqwest that maps failures onto [`GatewayError`].

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use url::Url;

use super::status::describe_status;
use crate::error::GatewayError;

const USER_AGENT: &str = concat!("gemgate/", env!("GEMGATE_VERSION"));

/// Build the shared reqwest client. `timeout` bounds each whole request.
pub fn build_http_client(timeout: Duration) -> Result<HttpClient> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    Ok(HttpClient::new(client))
}

/// HTTP client for upstream metadata requests. No retries: a failed
/// request is reported to the caller as-is.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request with query parameters and returns the raw body
    /// of a successful response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_bytes_with_query(
        &self,
        url: &Url,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, GatewayError> {
        debug!("GET {} with query {:?}...", url, query);

        let transport = |source| GatewayError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                url: url.to_string(),
                reason: describe_status(status),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!("Received {} bytes from {}", body.len(), url);

        Ok(body.to_vec())
    }
}
