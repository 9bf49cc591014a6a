//! The three calls that make up one Athena query.
//!
//! - [`submit_query`]: send the search, get back a [`Submission`]
//! - [`poll_for_results`]: re-fetch status until the query leaves `PENDING`
//! - [`fetch_all_articles`]: walk the result pages of a finished query
//!
//! All three are generic over [`Transport`] and do no retrying of their own
//! apart from the `PENDING` poll loop. A failed fetch anywhere is returned to
//! the caller as-is.

use crate::error::{AthenaError, Result};
use crate::models::{
    Article, PagePayload, PageResponse, QueryHandle, QueryStatus, SearchRequest, StatusPayload,
    Submission,
};
use crate::transport::{Endpoint, Transport};
use crate::utils::truncate_for_log;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// How the poll loop paces itself and when (if ever) it gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between status fetches while the query is pending.
    pub interval: Duration,
    /// Stop after this many status fetches. `None` polls until the state changes.
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }
}

/// Send one search request.
///
/// The response is accepted only when its `state` is `SUCCESS` and it carries
/// a non-empty `query_id`. Anything else comes back as
/// [`Submission::Rejected`] with the payload's `message`, or a generic
/// description when there is none.
///
/// # Arguments
///
/// * `transport` - Carrier for the `query-async` POST
/// * `request` - Query text, key phrases, toggle state, date range and API key
///
/// # Returns
///
/// [`Submission::Submitted`] holding the query handle, or
/// [`Submission::Rejected`] with a human-readable reason.
///
/// # Errors
///
/// [`AthenaError::Transport`] when the POST fails or returns a non-2xx status.
///
/// # Example
///
/// ```ignore
/// match submit_query(&transport, &request).await? {
///     Submission::Submitted { handle } => info!(%handle, "submitted"),
///     Submission::Rejected { message } => return Err(AthenaError::QueryRejected(message)),
/// }
/// ```
#[instrument(level = "info", skip_all, fields(query = %request.query, range = %request.range))]
pub async fn submit_query<T: Transport>(transport: &T, request: &SearchRequest) -> Result<Submission> {
    let data = transport
        .post(Endpoint::QueryAsync, &request.to_payload())
        .await?;

    let state = data.get("state").and_then(|s| s.as_str());
    let query_id = data
        .get("query_id")
        .and_then(|id| id.as_str())
        .filter(|id| !id.is_empty());

    let submission = match (state, query_id) {
        (Some("SUCCESS"), Some(id)) => Submission::Submitted {
            handle: QueryHandle(id.to_string()),
        },
        (Some("SUCCESS"), None) => Submission::Rejected {
            message: "failed to retrieve query identifier".to_string(),
        },
        _ => Submission::Rejected {
            message: data
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("query submission failed: {data}")),
        },
    };

    match &submission {
        Submission::Submitted { handle } => info!(%handle, "Query submitted"),
        Submission::Rejected { message } => warn!(
            message = %truncate_for_log(message, 300),
            "Query submission rejected"
        ),
    }
    Ok(submission)
}

/// Fetch the status of `handle` until it is no longer `PENDING`.
///
/// Returns the first non-pending status, whatever its state. Transport
/// failures are not retried. With no `max_attempts` this can wait forever on
/// a query the API never finishes.
///
/// # Arguments
///
/// * `transport` - Carrier for the `get-results` status POSTs
/// * `handle` - Query identifier returned by [`submit_query`]
/// * `api_key` - Caller credential, sent with every status request
/// * `policy` - Sleep between polls and optional attempt cap
///
/// # Returns
///
/// The first [`QueryStatus`] whose state is not `PENDING`, with its raw payload.
///
/// # Errors
///
/// - [`AthenaError::Transport`] on any failed status request
/// - [`AthenaError::PollAttemptsExhausted`] when `max_attempts` statuses were all pending
///
/// # Example
///
/// ```ignore
/// let policy = PollPolicy::unbounded(Duration::from_secs(1));
/// let status = poll_for_results(&transport, &handle, &api_key, policy).await?;
/// ```
#[instrument(level = "info", skip_all, fields(%handle))]
pub async fn poll_for_results<T: Transport>(
    transport: &T,
    handle: &QueryHandle,
    api_key: &str,
    policy: PollPolicy,
) -> Result<QueryStatus> {
    let t0 = Instant::now();
    let payload = StatusPayload {
        query_id: handle.as_str(),
        api_key,
    };
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let status = QueryStatus::from_value(transport.post(Endpoint::GetResults, &payload).await?)?;

        if !status.state.is_pending() {
            info!(
                attempt,
                state = ?status.state,
                total_articles = status.total_articles,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Query left pending state"
            );
            return Ok(status);
        }

        if policy.max_attempts.is_some_and(|max| attempt >= max) {
            warn!(
                attempt,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Poll attempts exhausted while query still pending"
            );
            return Err(AthenaError::PollAttemptsExhausted { attempts: attempt });
        }

        debug!(attempt, interval = ?policy.interval, "Query pending; sleeping");
        sleep(policy.interval).await;
    }
}

/// Fetch every result page of a finished query.
///
/// Pages are requested in order from 1 until `page_size * pages >= total`,
/// and their articles concatenated as received. A failure on any page fails
/// the whole call.
///
/// # Arguments
///
/// * `transport` - Carrier for the `get-results` page POSTs
/// * `handle` - Identifier of a query that finished with `SUCCESS`
/// * `total` - Article count reported by the final status
/// * `api_key` - Caller credential
/// * `toggle_state` - Result-set selector, sent with every page request
/// * `page_size` - Articles per page the API serves
///
/// # Returns
///
/// Every article from pages `1..=ceil(total / page_size)`, in page order.
///
/// # Errors
///
/// [`AthenaError::Transport`] or [`AthenaError::Parse`] from the first page that fails.
///
/// # Example
///
/// ```ignore
/// let articles =
///     fetch_all_articles(&transport, &handle, status.total_articles, &api_key, "All Articles", 25)
///         .await?;
/// ```
#[instrument(level = "info", skip_all, fields(%handle, total = total))]
pub async fn fetch_all_articles<T: Transport>(
    transport: &T,
    handle: &QueryHandle,
    total: u64,
    api_key: &str,
    toggle_state: &str,
    page_size: u64,
) -> Result<Vec<Article>> {
    let mut articles = Vec::new();
    let mut page = 1u64;

    while (page - 1) * page_size < total {
        let payload = PagePayload {
            query_id: handle.as_str(),
            api_key,
            toggle_state,
            page,
        };
        let data = transport.post(Endpoint::GetResults, &payload).await?;
        let body: PageResponse = serde_json::from_value(data)
            .map_err(|e| AthenaError::Parse(format!("results page {page}: {e}")))?;

        debug!(page, count = body.articles.len(), "Fetched results page");
        articles.extend(body.articles);
        page += 1;
    }

    info!(pages = page - 1, count = articles.len(), "Fetched all result pages");
    Ok(articles)
}
