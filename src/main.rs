//! # Athena News CLI
//!
//! Runs one search against the Athena news-search API and writes the matching
//! articles as JSON.
//!
//! ## Usage
//!
//! ```sh
//! ATHENA_API_KEY=... athena_news -s 2024-01-01 -e 2024-01-20 -q "rate cuts" -j ./json
//! ```
//!
//! Long date ranges are split into weekly chunks and queried one after
//! another; see the library docs for the details.

use athena_news::outputs::json;
use athena_news::utils::ensure_writable_dir;
use athena_news::{ClientConfig, DateRange, NewsClient, SearchParams};
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("athena_news starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.start_date, ?args.end_date, ?args.query, ?args.json_output_dir, "Parsed CLI arguments");

    // ---- Load config ----
    let config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    let config = args.apply_to(config)?;
    info!(
        base_url = %config.base_url,
        chunk_days = config.chunk_days,
        page_size = config.page_size,
        "Using client configuration"
    );

    // Validate the range up front so bad input fails before any request
    let range = DateRange::parse(&args.start_date, &args.end_date)?;

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }

    // ---- Search ----
    let client = NewsClient::http(config)?;
    let params = SearchParams {
        start_date: args.start_date.clone(),
        end_date: args.end_date.clone(),
        query: args.query.clone(),
        api_key: args.api_key.clone(),
        options: args.search_options(),
    };

    let articles = match client.search(&params).await {
        Ok(articles) => articles,
        Err(e) => {
            error!(error = %e, "Search failed");
            return Err(e.into());
        }
    };

    // ---- Output ----
    match &args.json_output_dir {
        Some(dir) => {
            json::write_articles(&articles, dir, &args.query, &range).await?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&articles)?);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = articles.len(),
        "Execution complete"
    );

    Ok(())
}
