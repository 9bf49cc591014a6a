//! Date-range chunking and result merging.
//!
//! The Athena API only accepts a bounded date window per query. A search over a
//! longer range is split into consecutive windows of at most
//! [`ClientConfig::chunk_days`] days, each run as its own
//! submit → poll → paginate cycle, strictly one after another. The articles of
//! every chunk are concatenated in chunk order, stable-sorted by score
//! (highest first), and filtered to those scoring above the threshold.
//!
//! A search that fits in a single window is run once and only filtered; its
//! articles keep the order the API returned them in.
//!
//! The first failing chunk aborts the whole search. Nothing from earlier
//! chunks is returned.

use crate::api::{PollPolicy, fetch_all_articles, poll_for_results, submit_query};
use crate::config::ClientConfig;
use crate::error::{AthenaError, Result};
use crate::models::{Article, DateRange, QueryState, SearchRequest, Submission};
use crate::transport::{HttpTransport, Transport};
use chrono::Duration as ChronoDuration;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

/// Parameters of one top-level search.
///
/// Optional fields fall back to the client's [`ClientConfig`].
#[derive(Clone, Default)]
pub struct SearchParams {
    pub start_date: String,
    pub end_date: String,
    pub query: String,
    pub api_key: String,
    pub options: SearchOptions,
}

impl std::fmt::Debug for SearchParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchParams")
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("query", &self.query)
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

/// Optional knobs of a search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// Extra phrases to refine the query. Sent as an empty string when unset.
    pub key_phrases: Option<String>,
    /// Filter mode forwarded to the API.
    pub toggle_state: Option<String>,
    /// Keep only articles scoring strictly above this.
    pub score_threshold: Option<f64>,
    /// Delay between status polls.
    pub poll_interval: Option<Duration>,
}

/// Split `range` into consecutive half-open windows of at most `chunk_days`.
///
/// Windows cover `[start, end)` with no gaps or overlaps; the last one is cut
/// short at `end`. An empty range yields no windows. The first window keeps
/// the caller's start text and the last keeps the caller's end text; only
/// the boundaries computed here are rendered with the `Z` marker.
pub fn split_range(range: &DateRange, chunk_days: i64) -> Vec<DateRange> {
    let step = ChronoDuration::days(chunk_days.max(1));
    let mut chunks = Vec::new();
    let mut current = range.start();

    while current < range.end() {
        let chunk_end = (current + step).min(range.end());
        let start_text = if current == range.start() {
            range.start_text().map(str::to_string)
        } else {
            None
        };
        let end_text = if chunk_end == range.end() {
            range.end_text().map(str::to_string)
        } else {
            None
        };
        chunks.push(DateRange::from_parts(current, chunk_end, start_text, end_text));
        current = chunk_end;
    }
    chunks
}

/// Stable sort by score, highest first. Missing scores sort as zero.
pub fn sort_by_score_desc(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.score().total_cmp(&a.score()));
}

/// Keep articles scoring strictly above `threshold`.
pub fn filter_by_score(articles: Vec<Article>, threshold: f64) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|a| a.score() > threshold)
        .collect()
}

/// Client for the Athena news-search API.
#[derive(Debug)]
pub struct NewsClient<T> {
    transport: T,
    config: ClientConfig,
}

impl NewsClient<HttpTransport> {
    /// Client over HTTPS using the endpoints and timeout in `config`.
    pub fn http(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> NewsClient<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a search over the full date range and return the filtered articles.
    ///
    /// Ranges longer than `chunk_days` whole days are split, run chunk by chunk
    /// and sorted by score; shorter ones are run once and left in API order.
    ///
    /// # Arguments
    ///
    /// * `params` - Date bounds as ISO-8601 text, query, API key and per-call options
    ///
    /// # Returns
    ///
    /// Articles scoring strictly above the threshold. Chunked searches are
    /// ordered by descending score.
    ///
    /// # Errors
    ///
    /// - [`AthenaError::InvalidDate`] or [`AthenaError::InvalidRange`] for bad bounds
    /// - [`AthenaError::QueryRejected`] when a submission is refused
    /// - [`AthenaError::QueryIncomplete`] when a query ends in a state other than `SUCCESS`
    /// - [`AthenaError::Transport`] on any failed request; the first failing chunk aborts the search
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = NewsClient::http(ClientConfig::default())?;
    /// let params = SearchParams {
    ///     start_date: "2024-01-01".into(),
    ///     end_date: "2024-01-20".into(),
    ///     query: "central bank rate decisions".into(),
    ///     api_key,
    ///     options: SearchOptions::default(),
    /// };
    /// let articles = client.search(&params).await?;
    /// ```
    #[instrument(level = "info", skip_all, fields(query = %params.query, start = %params.start_date, end = %params.end_date))]
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<Article>> {
        let t0 = Instant::now();
        let range = DateRange::parse(&params.start_date, &params.end_date)?;
        let threshold = params
            .options
            .score_threshold
            .unwrap_or(self.config.score_threshold);
        let delta_days = range.whole_days();

        let articles = if delta_days > self.config.chunk_days {
            let chunks = split_range(&range, self.config.chunk_days);
            info!(delta_days, chunks = chunks.len(), "Splitting date range");

            let mut all = Vec::new();
            for (index, chunk) in chunks.iter().enumerate() {
                let mut chunk_articles = self.run_chunk(params, chunk.clone()).await.map_err(|e| {
                    error!(chunk = index, range = %chunk, error = %e, "Chunk failed; aborting search");
                    e
                })?;
                info!(chunk = index, range = %chunk, count = chunk_articles.len(), "Chunk complete");
                all.append(&mut chunk_articles);
            }
            sort_by_score_desc(&mut all);
            all
        } else {
            self.run_chunk(params, range).await?
        };

        let fetched = articles.len();
        let kept = filter_by_score(articles, threshold);
        info!(
            fetched,
            kept = kept.len(),
            threshold,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(kept)
    }

    /// Run one submit → poll → paginate cycle for `range`.
    #[instrument(level = "info", skip_all, fields(%range))]
    pub async fn run_chunk(&self, params: &SearchParams, range: DateRange) -> Result<Vec<Article>> {
        let request = SearchRequest {
            query: params.query.clone(),
            key_phrases: params.options.key_phrases.clone().unwrap_or_default(),
            toggle_state: self.toggle_state(params).to_string(),
            range,
            api_key: params.api_key.clone(),
        };

        let handle = match submit_query(&self.transport, &request).await? {
            Submission::Submitted { handle } => handle,
            Submission::Rejected { message } => return Err(AthenaError::QueryRejected(message)),
        };

        let status = poll_for_results(
            &self.transport,
            &handle,
            &request.api_key,
            self.poll_policy(params),
        )
        .await?;
        if status.state != QueryState::Success {
            return Err(AthenaError::QueryIncomplete(status.raw));
        }

        if status.total_articles == 0 {
            info!(%handle, "Query matched no articles");
            return Ok(Vec::new());
        }

        fetch_all_articles(
            &self.transport,
            &handle,
            status.total_articles,
            &request.api_key,
            &request.toggle_state,
            self.config.page_size,
        )
        .await
    }

    fn toggle_state<'a>(&'a self, params: &'a SearchParams) -> &'a str {
        params
            .options
            .toggle_state
            .as_deref()
            .unwrap_or(&self.config.toggle_state)
    }

    fn poll_policy(&self, params: &SearchParams) -> PollPolicy {
        PollPolicy {
            interval: params
                .options
                .poll_interval
                .unwrap_or_else(|| self.config.poll_interval()),
            max_attempts: self.config.max_poll_attempts,
        }
    }
}

/// Query the Athena API with the default configuration.
///
/// Convenience entry point: builds an HTTPS client from
/// [`ClientConfig::default`] and runs a single [`NewsClient::search`].
///
/// # Example
///
/// ```ignore
/// let articles = athena_news::news(
///     "2024-01-01",
///     "2024-01-20",
///     "central bank rate decisions",
///     &api_key,
///     SearchOptions::default(),
/// )
/// .await?;
/// ```
pub async fn news(
    start_date: &str,
    end_date: &str,
    query: &str,
    api_key: &str,
    options: SearchOptions,
) -> Result<Vec<Article>> {
    let client = NewsClient::http(ClientConfig::default())?;
    client
        .search(&SearchParams {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            query: query.to_string(),
            api_key: api_key.to_string(),
            options,
        })
        .await
}
