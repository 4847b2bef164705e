//! # metronome-job
//!
//! The schedulable unit consumed by `metronome-scheduler`: a [`Job`] couples
//! a repeat interval with a bound callable and its own due-time state.
//!
//! Jobs are configured fluently and bound to a task last:
//!
//! ```
//! use metronome_job::Job;
//!
//! # fn main() -> Result<(), metronome_job::JobError> {
//! let job = Job::new(2).seconds().with_task(|| println!("tick"));
//! let digest = Job::new(1).days().at("10:30")?.with_task(|| println!("digest"));
//! # Ok(())
//! # }
//! ```
//!
//! A `Job` value is a cheap clonable handle; all clones share one underlying
//! job, and handle identity is job identity.

mod error;
mod job;
mod unit;

pub use error::JobError;
pub use job::{Job, Task};
pub use unit::{TimeOfDay, TimeUnit};
