//! Client configuration.
//!
//! Endpoint locations, page size, the chunking window and the search defaults
//! live in a [`ClientConfig`] owned by the client instead of process-wide
//! constants. A config can be loaded from a YAML file; any key left out falls
//! back to its default.
//!
//! ```yaml
//! base_url: https://app.runathena.com
//! page_size: 25
//! chunk_days: 7
//! score_threshold: 0.00055
//! poll_interval_ms: 1000
//! max_poll_attempts: 600
//! request_timeout_secs: 30
//! ```

use crate::error::{AthenaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://app.runathena.com";
pub const DEFAULT_QUERY_PATH: &str = "/api/v2/query-async";
pub const DEFAULT_RESULTS_PATH: &str = "/api/v2/get-results";
pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const DEFAULT_CHUNK_DAYS: i64 = 7;
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.00055;
pub const DEFAULT_TOGGLE_STATE: &str = "All Articles";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Settings shared by every request a [`crate::NewsClient`] makes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme and host of the Athena API.
    pub base_url: String,
    /// Path of the query submission endpoint.
    pub query_path: String,
    /// Path of the status/results endpoint.
    pub results_path: String,
    /// Articles returned per results page.
    pub page_size: u64,
    /// Widest date window sent in a single query, in days.
    pub chunk_days: i64,
    /// Articles must score strictly above this to be kept.
    pub score_threshold: f64,
    /// Filter mode forwarded to the API.
    pub toggle_state: String,
    /// Delay between status polls while a query is `PENDING`.
    pub poll_interval_ms: u64,
    /// Give up polling after this many status fetches. `None` polls forever.
    pub max_poll_attempts: Option<u32>,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            query_path: DEFAULT_QUERY_PATH.to_string(),
            results_path: DEFAULT_RESULTS_PATH.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            chunk_days: DEFAULT_CHUNK_DAYS,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            toggle_state: DEFAULT_TOGGLE_STATE.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: None,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Load and validate a config from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&raw)?;
        info!(base_url = %config.base_url, "Loaded client configuration");
        Ok(config)
    }

    /// Parse and validate a config from a YAML string.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Full URL of the submission endpoint.
    pub fn query_url(&self) -> Result<Url> {
        self.endpoint_url(&self.query_path)
    }

    /// Full URL of the status/results endpoint.
    pub fn results_url(&self) -> Result<Url> {
        self.endpoint_url(&self.results_path)
    }

    fn endpoint_url(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| AthenaError::Config(format!("invalid base_url {:?}: {e}", self.base_url)))?;
        base.join(path)
            .map_err(|e| AthenaError::Config(format!("invalid endpoint path {path:?}: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(AthenaError::Config(
                "page_size must be greater than 0".to_string(),
            ));
        }

        if self.chunk_days <= 0 {
            return Err(AthenaError::Config(
                "chunk_days must be greater than 0".to_string(),
            ));
        }

        if self.max_poll_attempts == Some(0) {
            return Err(AthenaError::Config(
                "max_poll_attempts must be greater than 0".to_string(),
            ));
        }

        self.query_url()?;
        self.results_url()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_public_api() {
        let config = ClientConfig::default();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.chunk_days, 7);
        assert_eq!(config.score_threshold, 0.00055);
        assert_eq!(config.toggle_state, "All Articles");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.max_poll_attempts, None);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(
            config.query_url().unwrap().as_str(),
            "https://app.runathena.com/api/v2/query-async"
        );
        assert_eq!(
            config.results_url().unwrap().as_str(),
            "https://app.runathena.com/api/v2/get-results"
        );
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let config = ClientConfig::from_yaml("page_size: 50\nmax_poll_attempts: 10\n").unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.max_poll_attempts, Some(10));
        assert_eq!(config.chunk_days, 7);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = ClientConfig::from_yaml("page_size: 0\n").unwrap_err();
        assert!(matches!(err, AthenaError::Config(_)));
    }

    #[test]
    fn test_zero_chunk_days_rejected() {
        let err = ClientConfig::from_yaml("chunk_days: 0\n").unwrap_err();
        assert!(matches!(err, AthenaError::Config(_)));
    }

    #[test]
    fn test_zero_max_poll_attempts_rejected() {
        let err = ClientConfig::from_yaml("max_poll_attempts: 0\n").unwrap_err();
        assert!(matches!(err, AthenaError::Config(ref m) if m.contains("max_poll_attempts")));

        let bounded = ClientConfig::from_yaml("max_poll_attempts: 1\n").unwrap();
        assert_eq!(bounded.max_poll_attempts, Some(1));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let err = ClientConfig::from_yaml("base_url: not a url\n").unwrap_err();
        assert!(matches!(err, AthenaError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://localhost:8080").unwrap();
        writeln!(file, "request_timeout_secs: 5").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(
            config.results_url().unwrap().as_str(),
            "http://localhost:8080/api/v2/get-results"
        );
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ClientConfig::load("/nonexistent/athena/config.yaml").unwrap_err();
        assert!(matches!(err, AthenaError::Io(_)));
    }
}
