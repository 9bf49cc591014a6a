//! # Athena News
//!
//! Client for the Athena news-search API. A search is submitted, polled until
//! the API has finished it, and its result pages are collected. Date ranges
//! wider than the API's window are split into consecutive chunks whose results
//! are merged, sorted by relevance and filtered by a minimum score.
//!
//! ## Usage
//!
//! ```ignore
//! use athena_news::{ClientConfig, NewsClient, SearchOptions, SearchParams};
//!
//! let client = NewsClient::http(ClientConfig::default())?;
//! let articles = client
//!     .search(&SearchParams {
//!         start_date: "2024-01-01".into(),
//!         end_date: "2024-01-20".into(),
//!         query: "central bank rate decisions".into(),
//!         api_key,
//!         options: SearchOptions::default(),
//!     })
//!     .await?;
//! ```
//!
//! ## Architecture
//!
//! 1. **Splitting**: [`search::split_range`] cuts the range into `chunk_days` windows
//! 2. **Submitting**: [`api::submit_query`] sends one query per window
//! 3. **Polling**: [`api::poll_for_results`] waits out the `PENDING` state
//! 4. **Paging**: [`api::fetch_all_articles`] collects every result page
//! 5. **Merging**: chunk results are concatenated, sorted and filtered

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod search;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod test_helpers;

pub use config::ClientConfig;
pub use error::{AthenaError, Result};
pub use models::{Article, DateRange, QueryHandle, QueryState, QueryStatus, SearchRequest, Submission};
pub use search::{NewsClient, SearchOptions, SearchParams, news};
pub use transport::{Endpoint, HttpTransport, Transport};
