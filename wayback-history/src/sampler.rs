use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use log::{debug, info};

use crate::capture::Capture;
use crate::cdx::{fetch_captures, sort_chronologically, IndexFetcher, IndexQuery, SortOrder};
use crate::error::{HistoryError, Result};

/// Rows requested by the primary periodic fetch
pub const PRIMARY_FETCH_LIMIT: usize = 5000;
/// Rows requested when topping up a stale result set with recent captures
pub const RECENT_FETCH_LIMIT: usize = 100;
/// A horizon more than this many years behind the current year is stale
pub const STALE_AFTER_YEARS: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Years between samples; anything below 1 is treated as 1
    pub year_interval: i32,
    /// Samples to emit after the anchor, 0 for no limit
    pub max_samples: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            year_interval: 1,
            max_samples: 0,
        }
    }
}

/// Receives what the sampler decides while it runs. Every hook defaults to
/// doing nothing.
pub trait SampleObserver {
    fn window(
        &self,
        _anchor: NaiveDate,
        _horizon: NaiveDate,
        _interval: i32,
        _candidates: usize,
    ) {
    }

    fn horizon_unreadable(&self, _latest: &Capture, _error: &HistoryError) {}

    fn extended(&self, _added: usize, _horizon: NaiveDate) {}

    fn extension_failed(&self, _error: &HistoryError) {}

    fn selected(&self, _target: NaiveDate, _capture: &Capture) {}

    fn duplicate(&self, _target: NaiveDate, _capture: &Capture) {}
}

/// Forwards sampler events to the `log` facade
pub struct LogObserver;

impl SampleObserver for LogObserver {
    fn window(&self, anchor: NaiveDate, horizon: NaiveDate, interval: i32, candidates: usize) {
        info!(
            "oldest snapshot {}, newest snapshot {}: sampling every {} year(s) from {} candidates",
            anchor, horizon, interval, candidates
        );
    }

    fn horizon_unreadable(&self, latest: &Capture, error: &HistoryError) {
        debug!(
            "latest capture {} unreadable ({}), using today as the horizon",
            latest.timestamp, error
        );
    }

    fn extended(&self, added: usize, horizon: NaiveDate) {
        debug!("added {} recent captures, horizon now {}", added, horizon);
    }

    fn extension_failed(&self, error: &HistoryError) {
        debug!("could not fetch recent captures: {}", error);
    }

    fn selected(&self, target: NaiveDate, capture: &Capture) {
        debug!("{}: selected {}", target, capture.timestamp);
    }

    fn duplicate(&self, target: NaiveDate, capture: &Capture) {
        debug!("{}: nearest is {} again, skipping", target, capture.timestamp);
    }
}

/// Picks one capture per `year_interval` years, starting from the oldest.
pub struct PeriodicSampler {
    config: SamplerConfig,
    today: NaiveDate,
    observer: Box<dyn SampleObserver>,
}

impl PeriodicSampler {
    pub fn new(config: SamplerConfig) -> PeriodicSampler {
        PeriodicSampler {
            config,
            today: Utc::now().date_naive(),
            observer: Box::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl SampleObserver + 'static) -> PeriodicSampler {
        self.observer = Box::new(observer);
        self
    }

    /// Pin "now", which decides staleness and stands in for an unreadable horizon
    pub fn with_today(mut self, today: NaiveDate) -> PeriodicSampler {
        self.today = today;
        self
    }

    pub fn year_interval(&self) -> i32 {
        self.config.year_interval.max(1)
    }

    /// Sample an ascending capture list. `fetcher` and `url` are only used
    /// to top up a stale list with recent captures, and a failure there is
    /// not reported.
    pub fn sample<F: IndexFetcher + ?Sized>(
        &self,
        fetcher: &F,
        url: &str,
        captures: Vec<Capture>,
    ) -> Result<Vec<Capture>> {
        if captures.len() <= 1 {
            return Ok(captures);
        }

        let anchor = captures[0].clone();
        let anchor_time = anchor.captured_at()?;

        let latest = &captures[captures.len() - 1];
        let mut horizon = match latest.captured_at() {
            Ok(time) => time.date(),
            Err(e) => {
                self.observer.horizon_unreadable(latest, &e);
                self.today
            }
        };

        let mut working = captures;
        if horizon.year() < self.today.year() - STALE_AFTER_YEARS {
            let query = IndexQuery::new(url, RECENT_FETCH_LIMIT).sort(Some(SortOrder::Reverse));
            match fetch_captures(fetcher, &query) {
                Ok(recent) => {
                    let newest = recent
                        .iter()
                        .filter_map(|capture| capture.captured_at().ok())
                        .max();
                    if let Some(newest) = newest {
                        horizon = newest.date();
                        self.observer.extended(recent.len(), horizon);
                        working.extend(recent);
                    }
                }
                Err(e) => self.observer.extension_failed(&e),
            }
        }

        self.observer.window(
            anchor_time.date(),
            horizon,
            self.year_interval(),
            working.len(),
        );

        Ok(self.scan(anchor, anchor_time, horizon.year(), &working))
    }

    fn scan(
        &self,
        anchor: Capture,
        anchor_time: NaiveDateTime,
        horizon_year: i32,
        working: &[Capture],
    ) -> Vec<Capture> {
        let interval = self.year_interval();
        let timeline: Vec<(NaiveDateTime, &Capture)> = working
            .iter()
            .filter_map(|capture| capture.captured_at().ok().map(|time| (time, capture)))
            .collect();

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(anchor.timestamp.clone());
        let mut result = vec![anchor];
        let mut emitted = 0;

        let mut next_year = anchor_time.year().checked_add(interval);
        while let Some(year) = next_year {
            if year > horizon_year {
                break;
            }
            if self.config.max_samples > 0 && emitted >= self.config.max_samples {
                break;
            }

            if let Some(target) = target_date(anchor_time.date(), year) {
                if let Some(nearest) = nearest(&timeline, target) {
                    if seen.contains(&nearest.timestamp) {
                        self.observer.duplicate(target, nearest);
                    } else {
                        self.observer.selected(target, nearest);
                        seen.insert(nearest.timestamp.clone());
                        result.push(nearest.clone());
                        emitted += 1;
                    }
                }
            }

            next_year = year.checked_add(interval);
        }

        result
    }
}

/// Fetch everything the index holds for `url` (one bounded query) and sample it.
pub fn periodic_snapshots<F: IndexFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    sampler: &PeriodicSampler,
) -> Result<Vec<Capture>> {
    let query = IndexQuery::new(url, PRIMARY_FETCH_LIMIT);
    let mut captures = fetch_captures(fetcher, &query)?;
    sort_chronologically(&mut captures);
    sampler.sample(fetcher, &query.url, captures)
}

/// The anchor's month and day in `year`. Feb 29 rolls over to Mar 1.
pub fn target_date(anchor: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, anchor.month(), anchor.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, anchor.month() + 1, 1))
}

/// Seconds between a capture and midnight UTC on `target`
fn distance(time: NaiveDateTime, target: NaiveDate) -> i64 {
    let whole_days = time.date().signed_duration_since(target).num_seconds();
    (whole_days + i64::from(time.num_seconds_from_midnight())).abs()
}

/// First capture with the smallest distance to `target`
fn nearest<'c>(
    timeline: &[(NaiveDateTime, &'c Capture)],
    target: NaiveDate,
) -> Option<&'c Capture> {
    timeline
        .iter()
        .min_by_key(|(time, _)| distance(*time, target))
        .map(|(_, capture)| *capture)
}
