//! Utility functions for date handling, string manipulation, and file system operations.
//!
//! - ISO-8601 parsing and formatting for the API's date fields
//! - String truncation and slugification for logging and file names
//! - File system validation for output directories

use crate::error::{AthenaError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Parse an ISO-8601 date or datetime as sent to the API.
///
/// A trailing `Z` is stripped before parsing and a `±HH:MM` offset is folded
/// into the time, so the result is a naive UTC timestamp. Bare dates resolve
/// to midnight.
///
/// # Examples
///
/// ```ignore
/// parse_iso_datetime("2024-01-01")?;
/// parse_iso_datetime("2024-01-01T12:30:00Z")?;
/// parse_iso_datetime("2024-01-01T12:30:00.250")?;
/// parse_iso_datetime("2024-01-01T14:30:00+02:00")?;
/// ```
pub fn parse_iso_datetime(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AthenaError::InvalidDate(raw.to_string()))
}

/// Serialize a timestamp for the API, re-appending the UTC marker.
///
/// Fractional seconds are only written when non-zero.
pub fn format_iso_datetime(dt: &NaiveDateTime) -> String {
    format!("{}Z", dt.format("%Y-%m-%dT%H:%M:%S%.f"))
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a char boundary)
/// with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Convert free text to a file-name friendly slug.
///
/// Lowercases, drops anything that isn't alphanumeric, and joins the
/// remaining words with single hyphens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Fed Rate Cuts!"), "fed-rate-cuts");
/// ```
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path).await?;
    // Sync std fs write keeps the error surface simple
    let scratch = format!("{}/..__write_check__", path.trim_end_matches('/'));
    stdfs::File::create(&scratch)?;
    let _ = stdfs::remove_file(&scratch);
    info!("Output directory is writable");
    Ok(())
}
