use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};

/// CDX timestamps are 14 digits of UTC wall-clock time, e.g. `20100601123000`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub const DEFAULT_ARCHIVE_BASE: &str = "http://web.archive.org";

/// One archived snapshot of a URL as reported by the timestamp index.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Capture {
    pub timestamp: String,
    /// Replay URL, `<base>/web/<timestamp>/<original>`
    pub url: String,
    pub original: String,
    pub mime_type: String,
    pub status: String,
    pub digest: String,
}

impl Capture {
    pub fn new(
        archive_base: &str,
        timestamp: &str,
        original: &str,
        mime_type: &str,
        status: &str,
        digest: &str,
    ) -> Capture {
        Capture {
            timestamp: timestamp.to_string(),
            url: archived_url(archive_base, timestamp, original),
            original: original.to_string(),
            mime_type: mime_type.to_string(),
            status: status.to_string(),
            digest: digest.to_string(),
        }
    }

    pub fn captured_at(&self) -> Result<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// `YYYY-MM-DD HH:MM:SS`, or the raw timestamp when it does not parse
    pub fn display_date(&self) -> String {
        match self.captured_at() {
            Ok(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
            Err(_) => self.timestamp.clone(),
        }
    }
}

pub fn parse_timestamp(timestamp: &str) -> Result<NaiveDateTime> {
    // chrono accepts shorter digit runs for some fields, CDX is always 14
    if timestamp.len() != 14 || !timestamp.chars().all(|c| c.is_ascii_digit()) {
        return Err(HistoryError::parse(
            "capture timestamp",
            format!("expected 14 digits, got {:?}", timestamp),
        ));
    }
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .map_err(|e| HistoryError::parse("capture timestamp", format!("{}: {}", timestamp, e)))
}

pub fn archived_url(archive_base: &str, timestamp: &str, original: &str) -> String {
    format!(
        "{}/web/{}/{}",
        archive_base.trim_end_matches('/'),
        timestamp,
        original
    )
}
