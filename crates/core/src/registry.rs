//! Station registry.
//!
//! The set of stations is fixed at construction; only each station's
//! `status` and `last_reading_at` change afterwards. Records are kept in seed
//! order, which is also the order a tick visits them.

use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;

use crate::error::CoreError;
use crate::metrics::Status;
use crate::station::Station;
use crate::types::{StationId, Timestamp};

#[derive(Debug)]
pub struct StationRegistry {
    stations: IndexMap<StationId, RwLock<Station>>,
}

impl StationRegistry {
    /// Build a registry from seed data. Duplicate ids are rejected.
    pub fn new(stations: impl IntoIterator<Item = Station>) -> Result<Self, CoreError> {
        let mut map = IndexMap::new();
        for station in stations {
            if map.contains_key(&station.id) {
                return Err(CoreError::Validation(format!(
                    "duplicate station id: {}",
                    station.id
                )));
            }
            map.insert(station.id.clone(), RwLock::new(station));
        }
        Ok(Self { stations: map })
    }

    /// Snapshot of every station in registry order.
    pub fn list(&self) -> Vec<Station> {
        self.stations
            .values()
            .map(|s| s.read().unwrap_or_else(PoisonError::into_inner).clone())
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Station> {
        self.stations
            .get(id)
            .map(|s| s.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stations.contains_key(id)
    }

    /// Station ids in registry order.
    pub fn ids(&self) -> Vec<StationId> {
        self.stations.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Record the outcome of the latest evaluation for a station.
    pub fn update_status(
        &self,
        id: &str,
        status: Status,
        last_reading_at: Timestamp,
    ) -> Result<(), CoreError> {
        let slot = self
            .stations
            .get(id)
            .ok_or_else(|| CoreError::UnknownStation(id.to_string()))?;
        let mut station = slot.write().unwrap_or_else(PoisonError::into_inner);
        station.status = status;
        station.last_reading_at = Some(last_reading_at);
        Ok(())
    }
}
