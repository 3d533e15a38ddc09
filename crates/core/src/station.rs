//! Monitoring station model.

use serde::{Deserialize, Serialize};

use crate::metrics::Status;
use crate::types::{StationId, Timestamp};

/// Geographic position of a station (WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

/// A fixed sensing location.
///
/// `id`, `name` and `coords` come from seed data and never change; `status`
/// and `last_reading_at` are rewritten by each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub coords: Coords,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub last_reading_at: Option<Timestamp>,
}

impl Station {
    pub fn new(id: impl Into<StationId>, name: impl Into<String>, coords: Coords) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coords,
            status: Status::Safe,
            last_reading_at: None,
        }
    }
}
