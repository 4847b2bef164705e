//! Error types for job configuration.

use thiserror::Error;

/// Errors raised while configuring a job.
#[derive(Debug, Error)]
pub enum JobError {
    /// Time-of-day string was not a valid `"HH:MM"` value.
    #[error("invalid time of day {0:?} (expected \"HH:MM\")")]
    InvalidTimeOfDay(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JobError::InvalidTimeOfDay("25:00".to_string());
        assert!(err.to_string().contains("invalid time of day"));
        assert!(err.to_string().contains("25:00"));
    }
}
