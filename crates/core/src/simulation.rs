//! Tick engine.
//!
//! [`SimulationLoop::tick`] advances every station by one reading and
//! returns the events that resulted. It does not publish anything itself;
//! the periodic driver in the service crate hands the events to an
//! [`EventSink`](crate::monitor_event::EventSink).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::alert_log::AlertLog;
use crate::error::CoreError;
use crate::metrics::Reading;
use crate::monitor_event::{MonitorEvent, ReadingEvent};
use crate::quality::detection::AlertGenerator;
use crate::quality::simulator::MetricSource;
use crate::quality::thresholds::ThresholdEvaluator;
use crate::registry::StationRegistry;
use crate::timeseries::TimeSeriesStore;
use crate::types::Timestamp;

/// Whether a tick is currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopState {
    Idle,
    Ticking,
}

pub struct SimulationLoop {
    registry: Arc<StationRegistry>,
    store: Arc<TimeSeriesStore>,
    alerts: Arc<AlertLog>,
    evaluator: ThresholdEvaluator,
    detector: AlertGenerator,
    /// Held for the whole tick, so ticks never overlap.
    source: Mutex<Box<dyn MetricSource>>,
    ticking: AtomicBool,
}

impl SimulationLoop {
    pub fn new(
        registry: Arc<StationRegistry>,
        store: Arc<TimeSeriesStore>,
        alerts: Arc<AlertLog>,
        evaluator: ThresholdEvaluator,
        detector: AlertGenerator,
        source: Box<dyn MetricSource>,
    ) -> Self {
        Self {
            registry,
            store,
            alerts,
            evaluator,
            detector,
            source: Mutex::new(source),
            ticking: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> LoopState {
        if self.ticking.load(Ordering::Acquire) {
            LoopState::Ticking
        } else {
            LoopState::Idle
        }
    }

    /// Give every station without history one initial reading stamped `at`.
    ///
    /// Status, alerts and events are left untouched. Returns the number of
    /// stations primed.
    pub fn prime(&self, at: Timestamp) -> usize {
        let mut source = self.source.lock().unwrap_or_else(PoisonError::into_inner);
        let mut primed = 0;
        for id in self.registry.ids() {
            if self.store.latest(&id).is_some() {
                continue;
            }
            let metrics = source.next(None);
            match self.store.append(&id, Reading::new(at, metrics)) {
                Ok(()) => primed += 1,
                Err(e) => tracing::warn!(station_id = %id, error = %e, "Failed to prime station"),
            }
        }
        primed
    }

    /// Run one tick at `now` across all stations in registry order.
    ///
    /// For each station the events are one `reading` followed by its
    /// `alert`s. A station that fails is logged and skipped.
    pub fn tick(&self, now: Timestamp) -> Vec<MonitorEvent> {
        let mut source = self.source.lock().unwrap_or_else(PoisonError::into_inner);
        self.ticking.store(true, Ordering::Release);

        let mut events = Vec::with_capacity(self.registry.len());
        let mut failed = 0usize;
        for id in self.registry.ids() {
            match self.step(&id, &mut **source, now) {
                Ok(station_events) => events.extend(station_events),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(station_id = %id, error = %e, "Station tick failed, skipping");
                }
            }
        }

        self.ticking.store(false, Ordering::Release);
        tracing::debug!(
            stations = self.registry.len(),
            failed,
            events = events.len(),
            "Simulation tick complete"
        );
        events
    }

    /// Advance a single station. Nothing is mutated unless every
    /// precondition holds.
    fn step(
        &self,
        station_id: &str,
        source: &mut dyn MetricSource,
        now: Timestamp,
    ) -> Result<Vec<MonitorEvent>, CoreError> {
        if !self.registry.contains(station_id) || !self.store.contains(station_id) {
            return Err(CoreError::UnknownStation(station_id.to_string()));
        }
        if let Some(latest) = self.store.latest(station_id) {
            if now < latest.timestamp {
                return Err(CoreError::Validation(format!(
                    "tick at {now} precedes latest reading at {}",
                    latest.timestamp
                )));
            }
        }

        let previous = self.store.latest(station_id).map(|r| r.metrics);
        let metrics = source.next(previous.as_ref());
        let status = self.evaluator.classify(&metrics);

        self.store.append(station_id, Reading::new(now, metrics))?;
        self.registry.update_status(station_id, status, now)?;

        let raised = self.detector.detect(station_id, &metrics, now);
        let alerts = match self.alerts.append(raised, self.detector.ids()) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(station_id, error = %e, "Dropping alerts for this reading");
                Vec::new()
            }
        };

        let mut events = Vec::with_capacity(1 + alerts.len());
        events.push(MonitorEvent::Reading(ReadingEvent {
            station_id: station_id.to_string(),
            timestamp: now,
            metrics,
            status,
        }));
        events.extend(alerts.into_iter().map(MonitorEvent::Alert));
        Ok(events)
    }
}

impl std::fmt::Debug for SimulationLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationLoop")
            .field("stations", &self.registry.len())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
