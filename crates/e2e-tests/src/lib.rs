//! Shared helpers for metronome end-to-end tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use metronome_scheduler::{Scheduler, SchedulerConfig};

/// Tick period used by loop tests; fast enough that a handful of ticks fit
/// in a few tens of milliseconds.
pub const TEST_TICK_MS: u64 = 20;

/// A scheduler with a fast tick for loop tests.
pub fn fast_scheduler() -> Scheduler {
    let config = SchedulerConfig {
        tick_period_ms: TEST_TICK_MS,
        ..Default::default()
    };
    Scheduler::with_config(&config).expect("test config is valid")
}

/// Shared run counter for probe jobs.
#[derive(Clone, Default)]
pub struct Probe {
    hits: Arc<AtomicU32>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the probe task has run.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    /// A task that bumps the counter; bind it with `with_task`.
    pub fn task(&self) -> impl FnMut() + Send + 'static {
        let hits = self.hits.clone();
        move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    }
}
