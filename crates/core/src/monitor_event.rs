//! Events produced by a simulation tick and pushed to live subscribers.
//!
//! The tick engine returns these as plain data; delivery goes through an
//! [`EventSink`] supplied by the surrounding service.

use serde::{Deserialize, Serialize};

use crate::alert::Alert;
use crate::metric_names::{EVENT_ALERT, EVENT_READING};
use crate::metrics::{MetricVector, Status};
use crate::types::{StationId, Timestamp};

/// Payload of a `reading` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingEvent {
    pub station_id: StationId,
    pub timestamp: Timestamp,
    pub metrics: MetricVector,
    pub status: Status,
}

/// A named event. Serializes as `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum MonitorEvent {
    Reading(ReadingEvent),
    Alert(Alert),
}

impl MonitorEvent {
    /// Wire name of the event (`"reading"` or `"alert"`).
    pub fn name(&self) -> &'static str {
        match self {
            MonitorEvent::Reading(_) => EVENT_READING,
            MonitorEvent::Alert(_) => EVENT_ALERT,
        }
    }

    pub fn station_id(&self) -> &str {
        match self {
            MonitorEvent::Reading(r) => &r.station_id,
            MonitorEvent::Alert(a) => &a.station_id,
        }
    }
}

/// Destination for published events.
///
/// Implementations must accept concurrent calls; each call delivers one
/// whole event.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: MonitorEvent);
}
