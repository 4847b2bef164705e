//! Error types for the scheduler crate.

use thiserror::Error;

use metronome_job::JobError;

/// Errors that can occur while configuring a scheduler or its jobs.
///
/// Name-addressed operations (`remove_named`, `pause_named`, ...) signal
/// "not found" through their boolean return value, never through an error.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Invalid IANA timezone string in the configuration.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Error configuring a job.
    #[error(transparent)]
    Job(#[from] JobError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchedulerError::InvalidTimezone("Bad/Zone".to_string());
        assert!(err.to_string().contains("invalid timezone"));
        assert!(err.to_string().contains("Bad/Zone"));

        let err: SchedulerError = JobError::InvalidTimeOfDay("9pm".to_string()).into();
        assert!(err.to_string().contains("9pm"));
    }
}
