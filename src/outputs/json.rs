//! JSON output of search results.
//!
//! The final article list is written as a pretty-printed JSON array, one file
//! per search, named after the query and the searched dates:
//! `{json_output_dir}/{query-slug}_{start}_{end}.json`.

use crate::error::{AthenaError, Result};
use crate::models::{Article, DateRange};
use crate::utils::slugify;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// File name for the results of `query` over `range`.
pub fn output_filename(query: &str, range: &DateRange) -> String {
    let slug = slugify(query);
    let slug = if slug.is_empty() { "search".to_string() } else { slug };
    format!(
        "{}_{}_{}.json",
        slug,
        range.start().format("%Y-%m-%d"),
        range.end().format("%Y-%m-%d")
    )
}

/// Write `articles` to `json_output_dir` and return the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, count = articles.len()))]
pub async fn write_articles(
    articles: &[Article],
    json_output_dir: &str,
    query: &str,
    range: &DateRange,
) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(articles)
        .map_err(|e| AthenaError::Parse(format!("failed to serialize articles: {e}")))?;

    fs::create_dir_all(json_output_dir).await?;
    let path = PathBuf::from(json_output_dir).join(output_filename(query, range));

    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote search results");
    Ok(path)
}
