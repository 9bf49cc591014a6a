//! Command-line interface definitions for Athena News.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The API key can be provided via flag or environment variable.

use athena_news::{ClientConfig, Result, SearchOptions};
use clap::Parser;
use std::time::Duration;

/// Command-line arguments for the Athena News client.
///
/// # Examples
///
/// ```sh
/// # Search a three-week window, print results to stdout
/// athena_news --start-date 2024-01-01 --end-date 2024-01-20 --query "rate cuts"
///
/// # Write results to a directory, with a custom config file
/// athena_news -s 2024-01-01 -e 2024-03-01 -q "rate cuts" -j ./json -c config.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Start of the search window (ISO-8601 date or datetime)
    #[arg(short, long)]
    pub start_date: String,

    /// End of the search window (ISO-8601 date or datetime)
    #[arg(short, long)]
    pub end_date: String,

    /// Search query text
    #[arg(short, long)]
    pub query: String,

    /// Athena API key
    #[arg(long, env = "ATHENA_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Key phrases to refine the search
    #[arg(short, long)]
    pub key_phrases: Option<String>,

    /// Toggle state forwarded to the API (e.g. "All Articles")
    #[arg(short, long)]
    pub toggle_state: Option<String>,

    /// Keep only articles scoring strictly above this
    #[arg(long)]
    pub score_threshold: Option<f64>,

    /// Milliseconds between status polls
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Stop polling a query after this many status checks
    #[arg(long)]
    pub max_poll_attempts: Option<u32>,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for the JSON results file (stdout when omitted)
    #[arg(short, long)]
    pub json_output_dir: Option<String>,
}

impl Cli {
    /// Fold flags that tune the client into `config` and re-validate it.
    pub fn apply_to(&self, mut config: ClientConfig) -> Result<ClientConfig> {
        if let Some(max) = self.max_poll_attempts {
            config.max_poll_attempts = Some(max);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            key_phrases: self.key_phrases.clone(),
            toggle_state: self.toggle_state.clone(),
            score_threshold: self.score_threshold,
            poll_interval: self.poll_interval_ms.map(Duration::from_millis),
        }
    }
}
