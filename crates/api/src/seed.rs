//! Loading of the initial station and alert sets from JSON files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use aquawatch_core::alert::Alert;
use aquawatch_core::monitor::Seed;
use aquawatch_core::station::Station;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed seed file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid seed data: {0}")]
    Validation(String),
}

/// Read the station list (required) and alert history (optional; a missing
/// file means no alerts).
pub fn load_seed(stations_path: &Path, alerts_path: &Path) -> Result<Seed, SeedError> {
    let stations: Vec<Station> = read_json(stations_path)?;
    validate_stations(&stations)?;

    let alerts: Vec<Alert> = if alerts_path.exists() {
        read_json(alerts_path)?
    } else {
        tracing::info!(path = %alerts_path.display(), "No alert seed file, starting empty");
        Vec::new()
    };

    tracing::info!(
        stations = stations.len(),
        alerts = alerts.len(),
        "Seed data loaded"
    );
    Ok(Seed { stations, alerts })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SeedError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_stations(stations: &[Station]) -> Result<(), SeedError> {
    let mut seen = HashSet::new();
    for station in stations {
        if station.id.trim().is_empty() {
            return Err(SeedError::Validation(format!(
                "station {:?} has an empty id",
                station.name
            )));
        }
        if !seen.insert(station.id.as_str()) {
            return Err(SeedError::Validation(format!(
                "duplicate station id {}",
                station.id
            )));
        }
    }
    Ok(())
}
