//! Per-station reading history.
//!
//! [`TimeSeriesStore`] keeps one time-ordered log per registered station.
//! Each log sits behind its own `RwLock`, so appends for one station never
//! contend with queries for another, and a query copies out a snapshot of
//! the matching range while holding the read lock.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};

use crate::error::CoreError;
use crate::metrics::Reading;
use crate::types::{StationId, Timestamp};

/// Number of readings returned by a query when the caller gives no limit.
pub const DEFAULT_QUERY_LIMIT: usize = 200;

/// Bounds on how much history each station keeps.
///
/// `max_readings_per_station` is enforced on every append (oldest entries
/// fall off the front). `max_age` is enforced by
/// [`TimeSeriesStore::prune_older_than`], which a background job calls
/// periodically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_readings_per_station: Option<usize>,
    pub max_age: Option<chrono::Duration>,
}

impl RetentionPolicy {
    /// Keep everything.
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Inclusive time window plus a cap on the number of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingQuery {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: usize,
}

impl Default for ReadingQuery {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

/// Append-only reading logs keyed by station.
#[derive(Debug)]
pub struct TimeSeriesStore {
    logs: HashMap<StationId, RwLock<VecDeque<Reading>>>,
    policy: RetentionPolicy,
}

impl TimeSeriesStore {
    /// Create empty logs for the given stations.
    pub fn new(station_ids: impl IntoIterator<Item = StationId>, policy: RetentionPolicy) -> Self {
        let logs = station_ids
            .into_iter()
            .map(|id| (id, RwLock::new(VecDeque::new())))
            .collect();
        Self { logs, policy }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    pub fn contains(&self, station_id: &str) -> bool {
        self.logs.contains_key(station_id)
    }

    /// Append a reading to the end of a station's log.
    ///
    /// Readings must arrive in time order; one stamped earlier than the
    /// current latest is rejected with `CoreError::Validation`.
    pub fn append(&self, station_id: &str, reading: Reading) -> Result<(), CoreError> {
        let log = self
            .logs
            .get(station_id)
            .ok_or_else(|| CoreError::UnknownStation(station_id.to_string()))?;

        let mut log = log.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = log.back() {
            if reading.timestamp < last.timestamp {
                return Err(CoreError::Validation(format!(
                    "reading for {station_id} at {} precedes latest at {}",
                    reading.timestamp, last.timestamp
                )));
            }
        }
        log.push_back(reading);

        if let Some(max) = self.policy.max_readings_per_station {
            while log.len() > max {
                log.pop_front();
            }
        }
        Ok(())
    }

    /// The most recent reading for a station, if any.
    pub fn latest(&self, station_id: &str) -> Option<Reading> {
        self.logs
            .get(station_id)?
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    /// Readings with `from <= timestamp <= to`, keeping at most the last
    /// `limit` matches, in chronological order.
    ///
    /// Unknown stations have no history and yield an empty result.
    pub fn query(&self, station_id: &str, query: ReadingQuery) -> Vec<Reading> {
        let Some(log) = self.logs.get(station_id) else {
            return Vec::new();
        };
        let log = log.read().unwrap_or_else(PoisonError::into_inner);

        let start = query
            .from
            .map_or(0, |from| log.partition_point(|r| r.timestamp < from));
        let end = query
            .to
            .map_or(log.len(), |to| log.partition_point(|r| r.timestamp <= to));
        if start >= end {
            return Vec::new();
        }

        let first = start.max(end.saturating_sub(query.limit));
        log.range(first..end).cloned().collect()
    }

    /// Number of readings held for a station.
    pub fn len(&self, station_id: &str) -> usize {
        self.logs
            .get(station_id)
            .map_or(0, |log| log.read().unwrap_or_else(PoisonError::into_inner).len())
    }

    /// Whether no station has any reading.
    pub fn is_empty(&self) -> bool {
        self.logs
            .values()
            .all(|log| log.read().unwrap_or_else(PoisonError::into_inner).is_empty())
    }

    /// Drop every reading stamped before `cutoff`. Returns how many were removed.
    pub fn prune_older_than(&self, cutoff: Timestamp) -> usize {
        let mut removed = 0;
        for log in self.logs.values() {
            let mut log = log.write().unwrap_or_else(PoisonError::into_inner);
            while log.front().is_some_and(|r| r.timestamp < cutoff) {
                log.pop_front();
                removed += 1;
            }
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
