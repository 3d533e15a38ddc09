use std::path::PathBuf;
use std::str::FromStr;

use aquawatch_core::monitor::MonitorConfig;
use aquawatch_core::quality::thresholds::DEFAULT_CAUTION_MARGIN;
use aquawatch_core::threshold_validation::validate_margin;
use aquawatch_core::timeseries::RetentionPolicy;

/// Error raised while reading [`ServerConfig`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5174`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds between simulation ticks (default: `8`).
    pub tick_interval_secs: u64,
    /// Seconds between WebSocket keep-alive pings (default: `30`).
    pub heartbeat_interval_secs: u64,
    /// Proportional distance from a limit that counts as caution.
    pub caution_margin: f64,
    pub seed_stations_path: PathBuf,
    pub seed_alerts_path: PathBuf,
    /// Per-station reading cap; `0` disables it.
    pub retention_max_readings: usize,
    /// Maximum reading age in hours; `0` disables it.
    pub retention_hours: i64,
    /// Alerts kept in memory; `0` disables the cap.
    pub retention_max_alerts: usize,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default              |
    /// |--------------------------|----------------------|
    /// | `HOST`                   | `0.0.0.0`            |
    /// | `PORT`                   | `5174`               |
    /// | `CORS_ORIGINS`           | `*`                  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                 |
    /// | `TICK_INTERVAL_SECS`     | `8`                  |
    /// | `HEARTBEAT_INTERVAL_SECS`| `30`                 |
    /// | `CAUTION_MARGIN`         | `0.1`                |
    /// | `SEED_STATIONS_PATH`     | `data/stations.json` |
    /// | `SEED_ALERTS_PATH`       | `data/alerts.json`   |
    /// | `RETENTION_MAX_READINGS` | `10000`              |
    /// | `RETENTION_HOURS`        | `168`                |
    /// | `RETENTION_MAX_ALERTS`   | `10000`              |
    /// | `LOG_FORMAT`             | `pretty`             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 5174)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        let tick_interval_secs: u64 = parse_or(&lookup, "TICK_INTERVAL_SECS", 8)?;
        if tick_interval_secs == 0 {
            return Err(invalid("TICK_INTERVAL_SECS", "0"));
        }

        let heartbeat_interval_secs: u64 = parse_or(&lookup, "HEARTBEAT_INTERVAL_SECS", 30)?;
        if heartbeat_interval_secs == 0 {
            return Err(invalid("HEARTBEAT_INTERVAL_SECS", "0"));
        }

        let caution_margin: f64 = parse_or(&lookup, "CAUTION_MARGIN", DEFAULT_CAUTION_MARGIN)?;
        if validate_margin(caution_margin, "CAUTION_MARGIN").is_err() {
            return Err(invalid("CAUTION_MARGIN", &caution_margin.to_string()));
        }

        let seed_stations_path = lookup("SEED_STATIONS_PATH")
            .unwrap_or_else(|| "data/stations.json".into())
            .into();
        let seed_alerts_path = lookup("SEED_ALERTS_PATH")
            .unwrap_or_else(|| "data/alerts.json".into())
            .into();

        let retention_max_readings: usize = parse_or(&lookup, "RETENTION_MAX_READINGS", 10_000)?;
        let retention_hours: i64 = parse_or(&lookup, "RETENTION_HOURS", 168)?;
        if retention_hours < 0 {
            return Err(invalid("RETENTION_HOURS", &retention_hours.to_string()));
        }

        let retention_max_alerts: usize = parse_or(&lookup, "RETENTION_MAX_ALERTS", 10_000)?;

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw
                .parse()
                .map_err(|()| invalid("LOG_FORMAT", &raw))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            tick_interval_secs,
            heartbeat_interval_secs,
            caution_margin,
            seed_stations_path,
            seed_alerts_path,
            retention_max_readings,
            retention_hours,
            retention_max_alerts,
            log_format,
        })
    }

    /// Whether `CORS_ORIGINS` is the `*` wildcard.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            max_readings_per_station: (self.retention_max_readings > 0)
                .then_some(self.retention_max_readings),
            max_age: (self.retention_hours > 0)
                .then(|| chrono::Duration::hours(self.retention_hours)),
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            caution_margin: self.caution_margin,
            retention: self.retention_policy(),
            max_alerts: (self.retention_max_alerts > 0).then_some(self.retention_max_alerts),
        }
    }
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|_| invalid(var, &raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5174);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert!(config.allows_any_origin());
        assert_eq!(config.tick_interval_secs, 8);
        assert_eq!(config.heartbeat_interval_secs, 30);
        assert_eq!(config.caution_margin, 0.1);
        assert_eq!(config.seed_stations_path, PathBuf::from("data/stations.json"));
        assert_eq!(config.log_format, LogFormat::Pretty);

        let retention = config.retention_policy();
        assert_eq!(retention.max_readings_per_station, Some(10_000));
        assert_eq!(retention.max_age, Some(chrono::Duration::hours(168)));
        assert_eq!(config.monitor_config().max_alerts, Some(10_000));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let config = load(&[("CORS_ORIGINS", "http://a.test, http://b.test,")]).unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn zero_disables_retention_bounds() {
        let config = load(&[
            ("RETENTION_MAX_READINGS", "0"),
            ("RETENTION_HOURS", "0"),
            ("RETENTION_MAX_ALERTS", "0"),
        ])
        .unwrap();
        assert_eq!(config.retention_policy(), RetentionPolicy::unbounded());
        assert_eq!(config.monitor_config().max_alerts, None);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert_matches!(
            load(&[("PORT", "seventy")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        );
        assert_matches!(
            load(&[("TICK_INTERVAL_SECS", "0")]),
            Err(ConfigError::Invalid { var: "TICK_INTERVAL_SECS", .. })
        );
        assert_matches!(
            load(&[("HEARTBEAT_INTERVAL_SECS", "0")]),
            Err(ConfigError::Invalid { var: "HEARTBEAT_INTERVAL_SECS", .. })
        );
        assert_matches!(
            load(&[("CAUTION_MARGIN", "1.5")]),
            Err(ConfigError::Invalid { var: "CAUTION_MARGIN", .. })
        );
        assert_matches!(
            load(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { var: "LOG_FORMAT", .. })
        );
    }

    #[test]
    fn json_log_format_is_recognised() {
        assert_eq!(load(&[("LOG_FORMAT", "JSON")]).unwrap().log_format, LogFormat::Json);
    }
}
