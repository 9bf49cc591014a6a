//! Request/response exchange with the Athena API.
//!
//! [`Transport`] is the seam between the orchestration logic and the network:
//! the submitter, poller and paginator only ever see JSON values coming back
//! from one of two [`Endpoint`]s. [`HttpTransport`] is the real implementation
//! on top of `reqwest`; tests swap in a scripted one.

use crate::config::ClientConfig;
use crate::error::{AthenaError, Result};
use crate::utils::truncate_for_log;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

/// The two API endpoints the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /api/v2/query-async`
    QueryAsync,
    /// `POST /api/v2/get-results`, used for both status and pages.
    GetResults,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::QueryAsync => f.write_str("query-async"),
            Endpoint::GetResults => f.write_str("get-results"),
        }
    }
}

/// Sends one JSON body to an endpoint and returns the decoded JSON response.
///
/// Implementations must map any non-success response to
/// [`AthenaError::Transport`].
pub trait Transport {
    async fn post<B>(&self, endpoint: Endpoint, body: &B) -> Result<serde_json::Value>
    where
        B: Serialize + Sync;
}

/// [`Transport`] over HTTPS using a shared `reqwest` client.
pub struct HttpTransport {
    client: Client,
    query_url: Url,
    results_url: Url,
}

impl HttpTransport {
    /// Build a transport from the endpoint and timeout settings in `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AthenaError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            query_url: config.query_url()?,
            results_url: config.results_url()?,
        })
    }

    fn url_for(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::QueryAsync => &self.query_url,
            Endpoint::GetResults => &self.results_url,
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("query_url", &self.query_url.as_str())
            .field("results_url", &self.results_url.as_str())
            .finish()
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(%endpoint))]
    async fn post<B>(&self, endpoint: Endpoint, body: &B) -> Result<serde_json::Value>
    where
        B: Serialize + Sync,
    {
        let t0 = Instant::now();
        let response = self
            .client
            .post(self.url_for(endpoint).clone())
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                body = %truncate_for_log(&message, 300),
                "Request failed"
            );
            return Err(AthenaError::Transport {
                status: Some(status.as_u16()),
                message,
            });
        }

        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AthenaError::Parse(format!("{endpoint} response: {e}")))?;
        debug!(
            status = status.as_u16(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Request succeeded"
        );
        Ok(value)
    }
}
