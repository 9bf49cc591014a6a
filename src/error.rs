//! Error types for the Athena client.
//!
//! Every fallible library operation returns [`Result`]. The three variants that
//! matter to callers of a search are [`AthenaError::Transport`],
//! [`AthenaError::QueryRejected`] and [`AthenaError::QueryIncomplete`]; the rest
//! cover input validation and the ambient config/IO plumbing.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AthenaError>;

/// Errors that can occur while talking to the Athena API.
#[derive(Debug, Error)]
pub enum AthenaError {
    /// The remote system answered with a non-success status, or the request
    /// never produced a response. Never retried automatically.
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status code, if a response was received.
        status: Option<u16>,
        /// Response body or underlying client error.
        message: String,
    },

    /// Submission did not yield a usable query handle.
    #[error("query rejected: {0}")]
    QueryRejected(String),

    /// Polling reached a terminal state other than `SUCCESS`.
    #[error("query did not complete successfully: {0}")]
    QueryIncomplete(serde_json::Value),

    /// The configured poll attempt limit was reached while still `PENDING`.
    #[error("query still pending after {attempts} poll attempts")]
    PollAttemptsExhausted { attempts: u32 },

    /// A response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// A date string could not be parsed as ISO-8601.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The end of a date range precedes its start.
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: String, end: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

impl AthenaError {
    /// Whether this error came from the request/response exchange itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, AthenaError::Transport { .. })
    }
}

impl From<reqwest::Error> for AthenaError {
    fn from(e: reqwest::Error) -> Self {
        AthenaError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_with_status() {
        let err = AthenaError::Transport {
            status: Some(502),
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "transport error (status 502): bad gateway");
        assert!(err.is_transport());
    }

    #[test]
    fn test_transport_display_without_status() {
        let err = AthenaError::Transport {
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn test_query_incomplete_carries_payload() {
        let payload = serde_json::json!({"state": "FAILED", "totalArticles": 0});
        let err = AthenaError::QueryIncomplete(payload);
        assert!(err.to_string().contains("FAILED"));
        assert!(!err.is_transport());
    }
}
