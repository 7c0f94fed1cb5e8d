pub mod capture;
pub mod cdx;
pub mod error;
pub mod present;
pub mod sampler;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::capture::{parse_timestamp, Capture, DEFAULT_ARCHIVE_BASE};
pub use crate::cdx::{
    check_status, decode_body, fetch_captures, normalize_rows, parse_date_bound,
    sort_chronologically, strip_protocol, CdxClient, CdxRow, ClientConfig, IndexFetcher,
    IndexQuery, SortOrder,
};
pub use crate::error::{HistoryError, Result};
pub use crate::sampler::{
    periodic_snapshots, LogObserver, PeriodicSampler, SampleObserver, SamplerConfig,
};
