//! Scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SchedulerError;

/// Configuration for a [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Default location for newly created jobs (IANA timezone string,
    /// e.g. "America/New_York"). Defaults to "UTC".
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Polling period of the execution loop in milliseconds.
    /// Defaults to 200.
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_tick_period_ms() -> u64 {
    200
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            tick_period_ms: default_tick_period_ms(),
        }
    }
}

impl SchedulerConfig {
    /// Parse the configured timezone string into a [`chrono_tz::Tz`].
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidTimezone`] if the string is not a
    /// valid IANA timezone identifier.
    pub fn parse_timezone(&self) -> Result<chrono_tz::Tz, SchedulerError> {
        self.default_timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| SchedulerError::InvalidTimezone(self.default_timezone.clone()))
    }

    /// The tick period as a [`Duration`]. Clamped to at least 1 ms, since a
    /// zero-period ticker cannot exist.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.default_timezone, "UTC");
        assert_eq!(config.tick_period_ms, 200);
        assert_eq!(config.tick_period(), Duration::from_millis(200));
    }

    #[test]
    fn test_parse_timezone() {
        let config = SchedulerConfig {
            default_timezone: "America/New_York".to_string(),
            ..Default::default()
        };
        let tz = config.parse_timezone().unwrap();
        assert_eq!(tz.name(), "America/New_York");
    }

    #[test]
    fn test_parse_invalid_timezone() {
        let config = SchedulerConfig {
            default_timezone: "Invalid/Zone".to_string(),
            ..Default::default()
        };
        match config.parse_timezone() {
            Err(SchedulerError::InvalidTimezone(tz)) => assert_eq!(tz, "Invalid/Zone"),
            other => panic!("expected InvalidTimezone, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_tick_period_is_clamped() {
        let config = SchedulerConfig {
            tick_period_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_period(), Duration::from_millis(1));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = SchedulerConfig {
            default_timezone: "Europe/London".to_string(),
            tick_period_ms: 50,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SchedulerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.default_timezone, "Europe/London");
        assert_eq!(parsed.tick_period_ms, 50);
    }

    #[test]
    fn test_serde_defaults_apply() {
        let parsed: SchedulerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.default_timezone, "UTC");
        assert_eq!(parsed.tick_period_ms, 200);
    }
}
