use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;

use crate::capture::{Capture, DEFAULT_ARCHIVE_BASE};
use crate::cdx::{CdxRow, IndexFetcher, IndexQuery, SortOrder};
use crate::error::{HistoryError, Result};
use crate::sampler::{PeriodicSampler, SampleObserver, SamplerConfig};

pub mod fixtures;

pub fn header() -> CdxRow {
    ["urlkey", "timestamp", "original", "mimetype", "statuscode", "digest", "length"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn row(timestamp: &str) -> CdxRow {
    [
        "com,example)/",
        timestamp,
        "http://example.com/",
        "text/html",
        "200",
        "DIGEST",
        "1024",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// A full response: header plus one row per timestamp
pub fn response(timestamps: &[&str]) -> Vec<CdxRow> {
    let mut rows = vec![header()];
    rows.extend(timestamps.iter().map(|ts| row(ts)));
    rows
}

pub fn captures(timestamps: &[&str]) -> Vec<Capture> {
    timestamps
        .iter()
        .map(|ts| {
            Capture::new(
                DEFAULT_ARCHIVE_BASE,
                ts,
                "http://example.com/",
                "text/html",
                "200",
                "DIGEST",
            )
        })
        .collect()
}

pub fn timestamps(captures: &[Capture]) -> Vec<&str> {
    captures.iter().map(|c| c.timestamp.as_str()).collect()
}

pub fn today(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sampler(year_interval: i32, max_samples: usize, now: NaiveDate) -> PeriodicSampler {
    PeriodicSampler::new(SamplerConfig {
        year_interval,
        max_samples,
    })
    .with_today(now)
}

/// Serves canned rows: `primary` for unsorted queries, `recent` for
/// `sort=reverse`, which fails when `None`. Every query is recorded.
pub struct ScriptedFetcher {
    pub primary: Vec<CdxRow>,
    pub recent: Option<Vec<CdxRow>>,
    pub queries: RefCell<Vec<IndexQuery>>,
}

impl ScriptedFetcher {
    pub fn new(primary: Vec<CdxRow>, recent: Option<Vec<CdxRow>>) -> ScriptedFetcher {
        ScriptedFetcher {
            primary,
            recent,
            queries: RefCell::new(Vec::new()),
        }
    }

    /// A fetcher that must never be asked for anything
    pub fn idle() -> ScriptedFetcher {
        ScriptedFetcher::new(Vec::new(), None)
    }

    pub fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl IndexFetcher for ScriptedFetcher {
    fn fetch(&self, query: &IndexQuery) -> Result<Vec<CdxRow>> {
        self.queries.borrow_mut().push(query.clone());
        match query.sort {
            Some(SortOrder::Reverse) => self.recent.clone().ok_or_else(|| {
                HistoryError::protocol("index returned HTTP 503 Service Unavailable")
            }),
            _ => Ok(self.primary.clone()),
        }
    }
}

/// Keeps the name of every observer hook that fired, in order
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Rc<RefCell<Vec<String>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn record(&self, event: String) {
        self.events.borrow_mut().push(event);
    }
}

impl SampleObserver for RecordingObserver {
    fn window(&self, anchor: NaiveDate, horizon: NaiveDate, _interval: i32, candidates: usize) {
        self.record(format!("window {} {} {}", anchor, horizon, candidates));
    }

    fn horizon_unreadable(&self, latest: &Capture, _error: &HistoryError) {
        self.record(format!("horizon_unreadable {}", latest.timestamp));
    }

    fn extended(&self, added: usize, horizon: NaiveDate) {
        self.record(format!("extended {} {}", added, horizon));
    }

    fn extension_failed(&self, _error: &HistoryError) {
        self.record("extension_failed".to_string());
    }

    fn duplicate(&self, target: NaiveDate, capture: &Capture) {
        self.record(format!("duplicate {} {}", target, capture.timestamp));
    }
}
