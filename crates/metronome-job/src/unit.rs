//! Time units and time-of-day values for job schedules.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::JobError;

/// Unit a job's repeat interval is counted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Seconds (the default unit).
    #[default]
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days. May be anchored to a [`TimeOfDay`].
    Days,
    /// Weeks. May be anchored to a weekday and a [`TimeOfDay`].
    Weeks,
}

impl TimeUnit {
    fn secs(self) -> i64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
            TimeUnit::Days => 86_400,
            TimeUnit::Weeks => 604_800,
        }
    }

    /// Duration of `interval` units. A zero interval yields a zero period;
    /// an interval past chrono's range saturates to [`Duration::MAX`].
    pub fn period(self, interval: u64) -> Duration {
        let interval = i64::try_from(interval).unwrap_or(i64::MAX);
        Duration::try_seconds(self.secs().saturating_mul(interval)).unwrap_or(Duration::MAX)
    }
}

/// A wall-clock time of day used to anchor day- and week-based schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    /// Hour in `0..24`.
    pub hour: u32,
    /// Minute in `0..60`.
    pub minute: u32,
}

impl TimeOfDay {
    /// Midnight, the default anchor for weekday schedules without `at`.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    /// Build a time of day, rejecting out-of-range fields.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }
}

impl FromStr for TimeOfDay {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || JobError::InvalidTimeOfDay(s.to_string());
        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse().map_err(|_| invalid())?;
        let minute = minute.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_period() {
        assert_eq!(TimeUnit::Seconds.period(30), Duration::seconds(30));
        assert_eq!(TimeUnit::Minutes.period(5), Duration::minutes(5));
        assert_eq!(TimeUnit::Hours.period(2), Duration::hours(2));
        assert_eq!(TimeUnit::Days.period(1), Duration::days(1));
        assert_eq!(TimeUnit::Weeks.period(3), Duration::weeks(3));
    }

    #[test]
    fn test_unit_zero_interval() {
        assert_eq!(TimeUnit::Seconds.period(0), Duration::zero());
        assert_eq!(TimeUnit::Weeks.period(0), Duration::zero());
    }

    #[test]
    fn test_unit_huge_interval_saturates() {
        assert_eq!(TimeUnit::Seconds.period(u64::MAX), Duration::MAX);
        assert_eq!(TimeUnit::Weeks.period(u64::MAX), Duration::MAX);
        assert_eq!(TimeUnit::Seconds.period(i64::MAX as u64), Duration::MAX);
    }

    #[test]
    fn test_time_of_day_parse() {
        let t: TimeOfDay = "04:05".parse().unwrap();
        assert_eq!((t.hour, t.minute), (4, 5));

        let t: TimeOfDay = "23:59".parse().unwrap();
        assert_eq!((t.hour, t.minute), (23, 59));
    }

    #[test]
    fn test_time_of_day_parse_invalid() {
        for bad in ["", "10", "24:00", "10:60", "aa:bb", "10:30:00"] {
            let result = bad.parse::<TimeOfDay>();
            assert!(
                matches!(result, Err(JobError::InvalidTimeOfDay(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_time_of_day_display() {
        let t: TimeOfDay = "04:05".parse().unwrap();
        assert_eq!(t.to_string(), "04:05");
        assert_eq!(TimeOfDay::MIDNIGHT.to_string(), "00:00");
    }
}
