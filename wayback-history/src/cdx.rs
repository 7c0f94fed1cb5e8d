use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::capture::{parse_timestamp, Capture, DEFAULT_ARCHIVE_BASE};
use crate::error::{HistoryError, Result};

/// A CDX response row, all positional string fields
pub type CdxRow = Vec<String>;

/// Fields a data row must carry: urlkey, timestamp, original, mimetype, statuscode, digest
pub const MIN_ROW_FIELDS: usize = 6;

/// Result ordering understood by the CDX server. Without one the index
/// returns captures oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum SortOrder {
    /// Captures closest to the present first
    Closest,
    /// Newest to oldest
    Reverse,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Closest => "closest",
            SortOrder::Reverse => "reverse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    /// Target URL with the protocol stripped
    pub url: String,
    pub limit: usize,
    pub sort: Option<SortOrder>,
    /// Inclusive `YYYYMMDD` bounds
    pub from: Option<String>,
    pub to: Option<String>,
}

impl IndexQuery {
    pub fn new(url: &str, limit: usize) -> IndexQuery {
        IndexQuery {
            url: strip_protocol(url),
            limit,
            sort: None,
            from: None,
            to: None,
        }
    }

    pub fn sort(mut self, sort: Option<SortOrder>) -> IndexQuery {
        self.sort = sort;
        self
    }

    pub fn between(mut self, from: Option<String>, to: Option<String>) -> IndexQuery {
        self.from = from;
        self.to = to;
        self
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("url", self.url.clone()),
            ("output", "json".to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(sort) = self.sort {
            params.push(("sort", sort.as_param().to_string()));
        }
        if let Some(from) = &self.from {
            params.push(("from", from.clone()));
        }
        if let Some(to) = &self.to {
            params.push(("to", to.clone()));
        }
        params
    }
}

/// Issues one query against a timestamp index and hands back its raw rows,
/// header included.
pub trait IndexFetcher {
    fn fetch(&self, query: &IndexQuery) -> Result<Vec<CdxRow>>;

    /// Prefix for replay URLs built from this index's rows
    fn archive_base(&self) -> &str {
        DEFAULT_ARCHIVE_BASE
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_ARCHIVE_BASE.to_string(),
            user_agent: format!("wayback-history/{}", env!("CARGO_PKG_VERSION")),
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// Blocking client for the Wayback Machine CDX server
pub struct CdxClient {
    client: Client,
    config: ClientConfig,
}

impl CdxClient {
    pub fn new(config: ClientConfig) -> Result<CdxClient> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(CdxClient {
            client: builder.build()?,
            config,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/cdx/search/cdx", self.config.base_url.trim_end_matches('/'))
    }
}

impl IndexFetcher for CdxClient {
    fn fetch(&self, query: &IndexQuery) -> Result<Vec<CdxRow>> {
        let endpoint = self.endpoint();
        debug!("querying {} with {:?}", endpoint, query.params());

        let response = self.client.get(&endpoint).query(&query.params()).send()?;
        check_status(response.status())?;

        let body = response.text()?;
        decode_body(&body)
    }

    fn archive_base(&self) -> &str {
        &self.config.base_url
    }
}

/// Anything but a 2xx from the index is a protocol failure
pub fn check_status(status: StatusCode) -> Result<()> {
    if !status.is_success() {
        return Err(HistoryError::protocol(format!(
            "index returned HTTP {}",
            status
        )));
    }
    Ok(())
}

/// Decode a CDX `output=json` body. The server answers a query with no
/// matches with an empty body, which is read as zero rows.
pub fn decode_body(body: &str) -> Result<Vec<CdxRow>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| HistoryError::parse("index response", e))?;

    serde_json::from_value(value).map_err(|e| {
        HistoryError::protocol(format!("expected an array of string arrays: {}", e))
    })
}

/// Turn raw rows into captures, in input order. The first row is the header.
/// Short rows and rows with an unreadable timestamp are dropped.
pub fn normalize_rows(rows: &[CdxRow], archive_base: &str) -> Vec<Capture> {
    if rows.len() <= 1 {
        return Vec::new();
    }

    rows[1..]
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            if row.len() < MIN_ROW_FIELDS {
                debug!("skipping row {}: only {} fields", i + 1, row.len());
                return None;
            }
            if let Err(e) = parse_timestamp(&row[1]) {
                debug!("skipping row {}: {}", i + 1, e);
                return None;
            }
            Some(Capture::new(
                archive_base,
                &row[1],
                &row[2],
                &row[3],
                &row[4],
                &row[5],
            ))
        })
        .collect()
}

/// Fetch and normalize in one step
pub fn fetch_captures<F: IndexFetcher + ?Sized>(
    fetcher: &F,
    query: &IndexQuery,
) -> Result<Vec<Capture>> {
    let rows = fetcher.fetch(query)?;
    Ok(normalize_rows(&rows, fetcher.archive_base()))
}

/// Stable sort by capture time, so equal timestamps keep their index order
pub fn sort_chronologically(captures: &mut [Capture]) {
    captures.sort_by_cached_key(|capture| capture.captured_at().ok());
}

pub fn strip_protocol(url: &str) -> String {
    let url = url.trim();
    let url = url.strip_prefix("http://").unwrap_or(url);
    let url = url.strip_prefix("https://").unwrap_or(url);
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Validate a `YYYYMMDD` date-range bound
pub fn parse_date_bound(value: &str) -> Result<String> {
    let value = value.trim();
    if value.len() != 8 || NaiveDate::parse_from_str(value, "%Y%m%d").is_err() {
        return Err(HistoryError::InvalidArgument(format!(
            "expected a YYYYMMDD date, got {:?}",
            value
        )));
    }
    Ok(value.to_string())
}
