//! Data models for Athena queries, their status, and the returned articles.
//!
//! - [`SearchRequest`]: one submission to the query endpoint
//! - [`Submission`]: what the submitter made of the response
//! - [`QueryStatus`]: a status payload from the results endpoint
//! - [`Article`]: one search hit; everything but the score is passed through untouched
//! - [`DateRange`]: a half-open `[start, end)` window
//!
//! The wire payload structs mirror the JSON bodies the API expects and use its
//! snake_case field names.

use crate::error::{AthenaError, Result};
use crate::utils::{format_iso_datetime, parse_iso_datetime};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier issued by the API for a submitted query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryHandle(pub String);

impl QueryHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A half-open date window `[start, end)`. `start <= end` always holds.
///
/// A bound that came from the caller keeps its original text and is sent to
/// the API unchanged; a bound computed while splitting is serialized with a
/// trailing `Z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
    start_text: Option<String>,
    end_text: Option<String>,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(AthenaError::InvalidRange {
                start: format_iso_datetime(&start),
                end: format_iso_datetime(&end),
            });
        }
        Ok(Self::from_parts(start, end, None, None))
    }

    /// Build a range from two ISO-8601 strings: bare dates, datetimes with or
    /// without a trailing `Z`, or datetimes with a `±HH:MM` offset.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let (start_dt, end_dt) = (parse_iso_datetime(start)?, parse_iso_datetime(end)?);
        if start_dt > end_dt {
            return Err(AthenaError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self::from_parts(
            start_dt,
            end_dt,
            Some(start.trim().to_string()),
            Some(end.trim().to_string()),
        ))
    }

    /// Unchecked constructor; callers guarantee `start <= end`.
    pub(crate) fn from_parts(
        start: NaiveDateTime,
        end: NaiveDateTime,
        start_text: Option<String>,
        end_text: Option<String>,
    ) -> Self {
        debug_assert!(start <= end);
        Self {
            start,
            end,
            start_text,
            end_text,
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// The caller's text for the start bound, if it was not computed.
    pub fn start_text(&self) -> Option<&str> {
        self.start_text.as_deref()
    }

    /// The caller's text for the end bound, if it was not computed.
    pub fn end_text(&self) -> Option<&str> {
        self.end_text.as_deref()
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whole days covered, rounded down.
    pub fn whole_days(&self) -> i64 {
        self.duration().num_days()
    }

    /// Start bound as sent to the API.
    pub fn start_iso(&self) -> String {
        self.start_text
            .clone()
            .unwrap_or_else(|| format_iso_datetime(&self.start))
    }

    /// End bound as sent to the API.
    pub fn end_iso(&self) -> String {
        self.end_text
            .clone()
            .unwrap_or_else(|| format_iso_datetime(&self.end))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_iso(), self.end_iso())
    }
}

/// A single query submission. Immutable once built.
#[derive(Clone)]
pub struct SearchRequest {
    pub query: String,
    pub key_phrases: String,
    pub toggle_state: String,
    pub range: DateRange,
    pub api_key: String,
}

impl fmt::Debug for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRequest")
            .field("query", &self.query)
            .field("key_phrases", &self.key_phrases)
            .field("toggle_state", &self.toggle_state)
            .field("range", &self.range)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl SearchRequest {
    pub fn to_payload(&self) -> QueryPayload<'_> {
        QueryPayload {
            query: &self.query,
            key_phrases: &self.key_phrases,
            api_key: &self.api_key,
            toggle_state: &self.toggle_state,
            start_date: self.range.start_iso(),
            end_date: self.range.end_iso(),
        }
    }
}

/// Outcome of a submission, resolved inside the submitter.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Submitted { handle: QueryHandle },
    Rejected { message: String },
}

/// Processing state reported by the results endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum QueryState {
    Pending,
    Success,
    /// Any other terminal state, kept verbatim.
    Other(String),
}

impl QueryState {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }
}

impl From<String> for QueryState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PENDING" => QueryState::Pending,
            "SUCCESS" => QueryState::Success,
            _ => QueryState::Other(s),
        }
    }
}

impl From<QueryState> for String {
    fn from(state: QueryState) -> Self {
        match state {
            QueryState::Pending => "PENDING".to_string(),
            QueryState::Success => "SUCCESS".to_string(),
            QueryState::Other(s) => s,
        }
    }
}

/// A status payload from the results endpoint.
///
/// The raw body is kept alongside the parsed fields so a failed query can be
/// reported with everything the API said about it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStatus {
    pub state: QueryState,
    pub total_articles: u64,
    pub raw: serde_json::Value,
}

impl QueryStatus {
    pub fn from_value(raw: serde_json::Value) -> Result<Self> {
        #[derive(Deserialize)]
        struct StatusBody {
            state: Option<QueryState>,
            #[serde(rename = "totalArticles", default)]
            total_articles: Option<f64>,
        }

        let body: StatusBody = serde_json::from_value(raw.clone())
            .map_err(|e| AthenaError::Parse(format!("status payload: {e}")))?;
        Ok(Self {
            state: body.state.unwrap_or_else(|| QueryState::Other(String::new())),
            // fractional or negative counts round up and clamp at zero
            total_articles: body.total_articles.map_or(0, |n| n.ceil().max(0.0) as u64),
            raw,
        })
    }
}

/// One search hit. Only `score` is interpreted; every other field is kept as-is.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Article {
    /// Relevance score, with a missing score counted as zero.
    pub fn score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Body of a `POST /api/v2/query-async` request.
#[derive(Debug, Serialize)]
pub struct QueryPayload<'a> {
    pub query: &'a str,
    pub key_phrases: &'a str,
    pub api_key: &'a str,
    pub toggle_state: &'a str,
    pub start_date: String,
    pub end_date: String,
}

/// Body of a status request to `POST /api/v2/get-results`.
#[derive(Debug, Serialize)]
pub struct StatusPayload<'a> {
    pub query_id: &'a str,
    pub api_key: &'a str,
}

/// Body of a page request to `POST /api/v2/get-results`.
#[derive(Debug, Serialize)]
pub struct PagePayload<'a> {
    pub query_id: &'a str,
    pub api_key: &'a str,
    pub toggle_state: &'a str,
    pub page: u64,
}

/// Response to a page request. Missing `articles` means an empty page.
#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let err = DateRange::parse("2024-02-01", "2024-01-01").unwrap_err();
        assert!(matches!(err, AthenaError::InvalidRange { .. }));
    }

    #[test]
    fn test_date_range_whole_days_rounds_down() {
        let range = DateRange::parse("2024-01-01T00:00:00Z", "2024-01-08T23:00:00Z").unwrap();
        assert_eq!(range.whole_days(), 7);
    }

    #[test]
    fn test_parse_keeps_caller_text() {
        let range = DateRange::parse("2024-01-01", "2024-01-03T10:00:00").unwrap();
        assert_eq!(range.start_iso(), "2024-01-01");
        assert_eq!(range.end_iso(), "2024-01-03T10:00:00");
    }

    #[test]
    fn test_parse_accepts_utc_offset() {
        let range = DateRange::parse("2024-01-01T00:00:00+00:00", "2024-01-02T02:00:00+02:00").unwrap();
        assert_eq!(range.whole_days(), 1);
        assert_eq!(range.start_iso(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_computed_bounds_get_utc_marker() {
        let start = parse_iso_datetime("2024-01-01").unwrap();
        let range = DateRange::new(start, start + Duration::days(7)).unwrap();
        assert_eq!(range.start_iso(), "2024-01-01T00:00:00Z");
        assert_eq!(range.end_iso(), "2024-01-08T00:00:00Z");
    }

    #[test]
    fn test_empty_range_is_valid() {
        let range = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
        assert_eq!(range.whole_days(), 0);
    }

    #[test]
    fn test_search_request_debug_redacts_key() {
        let request = SearchRequest {
            query: "rates".to_string(),
            key_phrases: String::new(),
            toggle_state: "All Articles".to_string(),
            range: DateRange::parse("2024-01-01", "2024-01-02").unwrap(),
            api_key: "secret-key".to_string(),
        };
        let debug = format!("{request:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_query_payload_shape() {
        let request = SearchRequest {
            query: "rates".to_string(),
            key_phrases: "fed".to_string(),
            toggle_state: "All Articles".to_string(),
            range: DateRange::parse("2024-01-01", "2024-01-08").unwrap(),
            api_key: "k".to_string(),
        };
        let value = serde_json::to_value(request.to_payload()).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "rates",
                "key_phrases": "fed",
                "api_key": "k",
                "toggle_state": "All Articles",
                "start_date": "2024-01-01",
                "end_date": "2024-01-08",
            })
        );
    }

    #[test]
    fn test_query_state_parsing() {
        assert_eq!(QueryState::from("PENDING".to_string()), QueryState::Pending);
        assert_eq!(QueryState::from("SUCCESS".to_string()), QueryState::Success);
        assert_eq!(
            QueryState::from("FAILED".to_string()),
            QueryState::Other("FAILED".to_string())
        );
    }

    #[test]
    fn test_query_status_defaults_missing_total() {
        let status = QueryStatus::from_value(json!({"state": "SUCCESS"})).unwrap();
        assert_eq!(status.state, QueryState::Success);
        assert_eq!(status.total_articles, 0);
    }

    #[test]
    fn test_query_status_tolerates_float_total() {
        let status = QueryStatus::from_value(json!({"state": "SUCCESS", "totalArticles": 40.0})).unwrap();
        assert_eq!(status.total_articles, 40);

        let status = QueryStatus::from_value(json!({"state": "SUCCESS", "totalArticles": 40.5})).unwrap();
        assert_eq!(status.total_articles, 41);
    }

    #[test]
    fn test_query_status_keeps_raw_payload() {
        let raw = json!({"state": "ERROR", "totalArticles": 3, "detail": "quota"});
        let status = QueryStatus::from_value(raw.clone()).unwrap();
        assert_eq!(status.state, QueryState::Other("ERROR".to_string()));
        assert_eq!(status.total_articles, 3);
        assert_eq!(status.raw, raw);
    }

    #[test]
    fn test_article_passes_through_unknown_fields() {
        let raw = json!({"title": "Rates hold", "url": "https://example.com/a", "score": 0.7});
        let article: Article = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(article.score(), 0.7);
        assert_eq!(article.fields["title"], "Rates hold");
        assert_eq!(serde_json::to_value(&article).unwrap(), raw);
    }

    #[test]
    fn test_article_missing_score_counts_as_zero() {
        let article: Article = serde_json::from_value(json!({"title": "No score"})).unwrap();
        assert_eq!(article.score, None);
        assert_eq!(article.score(), 0.0);
    }

    #[test]
    fn test_page_response_missing_articles_is_empty() {
        let page: PageResponse = serde_json::from_value(json!({"state": "SUCCESS"})).unwrap();
        assert!(page.articles.is_empty());
    }
}
