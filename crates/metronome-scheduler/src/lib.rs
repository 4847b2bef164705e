//! # metronome-scheduler
//!
//! An in-process, single-instance periodic task scheduler: register
//! callables to run at fixed repeating intervals (optionally anchored to a
//! time of day or weekday) and drive them from a background polling loop.
//!
//! The loop ticks every 200 ms by default, initializes every job against its
//! first tick so all jobs are phase-aligned, and runs due jobs sequentially
//! in ascending next-run order. Emergency jobs bypass the schedule entirely:
//! they run once on the next tick and are discarded.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use metronome_scheduler::Scheduler;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), metronome_scheduler::SchedulerError> {
//!     let scheduler = Scheduler::new();
//!
//!     scheduler.every(2).seconds().with_task(|| println!("tick"));
//!     scheduler
//!         .every_named(1, "digest")
//!         .days()
//!         .at("10:30")?
//!         .with_task(|| println!("daily digest"));
//!
//!     // blocks until the loop's first tick has initialized every job
//!     scheduler.start().await;
//!
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!
//!     // blocks until the loop has acknowledged and exited
//!     scheduler.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! All registry access, including the loop's own tick processing and the
//! job bodies it invokes, is serialized through one coarse lock per
//! scheduler. A slow job therefore delays everything on that scheduler;
//! distinct `Scheduler` instances are fully independent.

mod config;
mod error;
mod registry;
mod scheduler;

pub use config::SchedulerConfig;
pub use error::SchedulerError;
pub use registry::JobRegistry;
pub use scheduler::{default_scheduler, Scheduler};

pub use metronome_job::{Job, JobError, TimeOfDay, TimeUnit};
