//! The scheduler: registry facade, execution loop, and lifecycle controller.
//!
//! One background task drives the tick loop; every caller-facing operation
//! and the loop's own tick processing serialize through a single coarse
//! lock. Job bodies run while that lock is held, so a slow job delays all
//! scheduling operations on its scheduler for its duration.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use metronome_job::Job;

use crate::registry::JobRegistry;
use crate::{SchedulerConfig, SchedulerError};

/// Everything guarded by the scheduler's single coarse lock.
struct Core {
    registry: JobRegistry,
    emergency: Vec<Job>,
    is_running: bool,
    location: Tz,
}

/// Loop handle and stop signal, guarded separately so `start`/`stop` can
/// await without holding the core lock.
struct Lifecycle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// An in-process periodic task scheduler.
///
/// Jobs are registered through [`every`](Scheduler::every) and friends,
/// then driven by a background loop between [`start`](Scheduler::start)
/// and [`stop`](Scheduler::stop). Multiple schedulers are fully
/// independent and may run concurrently.
///
/// The registry keeps jobs sorted ascending by interval; execution within
/// a tick happens in ascending next-run order. The two orderings are
/// intentionally separate.
pub struct Scheduler {
    core: Arc<Mutex<Core>>,
    lifecycle: tokio::sync::Mutex<Lifecycle>,
    tick_period: Duration,
}

impl Scheduler {
    /// Create a scheduler with the default configuration: UTC location,
    /// 200 ms tick period.
    pub fn new() -> Self {
        Self::build(chrono_tz::UTC, SchedulerConfig::default().tick_period())
    }

    /// Create a scheduler from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidTimezone`] if the configured
    /// timezone does not parse.
    pub fn with_config(config: &SchedulerConfig) -> Result<Self, SchedulerError> {
        let location = config.parse_timezone()?;
        Ok(Self::build(location, config.tick_period()))
    }

    fn build(location: Tz, tick_period: Duration) -> Self {
        Self {
            core: Arc::new(Mutex::new(Core {
                registry: JobRegistry::new(),
                emergency: Vec::new(),
                is_running: false,
                location,
            })),
            lifecycle: tokio::sync::Mutex::new(Lifecycle {
                cancel: CancellationToken::new(),
                task: None,
            }),
            tick_period,
        }
    }

    /// Create a job repeating every `interval` units (seconds unless the
    /// returned handle selects another unit) and register it.
    pub fn every(&self, interval: u64) -> Job {
        let mut core = self.core.lock();
        let job = Job::new(interval).with_location(core.location);
        core.registry.add(job.clone());
        job
    }

    /// Like [`every`](Scheduler::every), additionally indexing the job
    /// under `name`. A job already registered under `name` is replaced.
    pub fn every_named(&self, interval: u64, name: &str) -> Job {
        let mut core = self.core.lock();
        let job = Job::new(interval).with_location(core.location);
        core.registry.add_named(name, job.clone());
        job
    }

    /// Create a job outside the normal schedule: it runs once on the next
    /// tick (or [`run_pending`](Scheduler::run_pending)), regardless of
    /// due-time checks, and is then discarded.
    pub fn emergency(&self) -> Job {
        let mut core = self.core.lock();
        let job = Job::new(1).with_location(core.location);
        core.emergency.push(job.clone());
        job
    }

    /// Start the background loop.
    ///
    /// Blocks until the loop's first tick has initialized every job, so
    /// `next_run` is defined for all registered jobs once this returns.
    /// A no-op when the loop is already active.
    pub async fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.task.is_some() {
            debug!("start ignored; scheduler loop already active");
            return;
        }

        let (started_tx, started_rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        lifecycle.cancel = cancel.clone();
        lifecycle.task = Some(tokio::spawn(run_loop(
            Arc::clone(&self.core),
            self.tick_period,
            cancel,
            started_tx,
        )));

        // The lifecycle lock stays held across the handshake, so a
        // concurrent stop() queues behind the confirmed first tick.
        if started_rx.await.is_err() {
            warn!("scheduler loop ended before confirming its first tick");
            return;
        }
        info!("scheduler started");
    }

    /// Stop the background loop.
    ///
    /// Blocks until the loop has acknowledged the signal and exited, so it
    /// never returns while a tick is still in flight; a subsequent
    /// [`start`](Scheduler::start) cannot race the old loop. A no-op when
    /// the loop is not active.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(task) = lifecycle.task.take() else {
            debug!("stop ignored; scheduler loop not active");
            return;
        };

        lifecycle.cancel.cancel();
        if let Err(err) = task.await {
            // the loop died earlier, usually of a panicking job body
            warn!(error = %err, "scheduler loop did not shut down cleanly");
        }
        info!("scheduler stopped");
    }

    /// Whether the loop is actively ticking.
    ///
    /// Flips to true only once the first tick has initialized every job,
    /// and back to false as soon as the loop exits, whether through
    /// [`stop`](Scheduler::stop) or a panicking job body.
    pub fn is_running(&self) -> bool {
        self.core.lock().is_running
    }

    /// Run everything due right now, without the loop. Kept for
    /// compatibility; prefer [`start`](Scheduler::start).
    ///
    /// Missed windows are not backfilled: a job due several times since the
    /// last call still runs only once.
    pub fn run_pending(&self) {
        let mut core = self.core.lock();
        process_tick(&mut core, Utc::now());
    }

    /// Force-run every job immediately, regardless of schedule. Kept for
    /// compatibility.
    pub async fn run_all(&self) {
        self.run_all_with_delay(Duration::ZERO).await;
    }

    /// Force-run every job in due order regardless of schedule, sleeping
    /// `delay` between invocations to spread load. Kept for compatibility.
    ///
    /// Unlike the tick path, the lock is released between jobs so the
    /// delays do not stall concurrent registry access.
    pub async fn run_all_with_delay(&self, delay: Duration) {
        let now = Utc::now();
        let jobs = self.core.lock().registry.due_order();
        for job in jobs {
            if !job.is_initialized() {
                job.initialize(now);
            }
            job.run();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Remove a job by handle. Returns whether it was registered.
    pub fn remove(&self, job: &Job) -> bool {
        self.core.lock().registry.remove(job)
    }

    /// Remove the job registered under `name`. Returns whether it existed.
    pub fn remove_named(&self, name: &str) -> bool {
        self.core.lock().registry.remove_named(name)
    }

    /// Update the interval of the job registered under `name`. Returns
    /// whether it existed.
    pub fn update_interval_named(&self, name: &str, interval: u64) -> bool {
        self.core.lock().registry.update_interval(name, interval)
    }

    /// Pause the job registered under `name`. Returns whether it existed.
    pub fn pause_named(&self, name: &str) -> bool {
        self.core.lock().registry.pause_named(name)
    }

    /// Resume the job registered under `name`. Returns whether it existed.
    pub fn resume_named(&self, name: &str) -> bool {
        self.core.lock().registry.resume_named(name)
    }

    /// Pause every registered job.
    pub fn pause_all(&self) {
        self.core.lock().registry.pause_all();
    }

    /// Resume every registered job.
    pub fn resume_all(&self) {
        self.core.lock().registry.resume_all();
    }

    /// Discard all registered jobs. Pending emergency jobs are kept.
    pub fn clear(&self) {
        self.core.lock().registry.clear();
    }

    /// Set the default location applied to newly created jobs.
    pub fn set_location(&self, location: Tz) {
        self.core.lock().location = location;
    }

    /// The soonest-due job and its next run time.
    ///
    /// `None` when no jobs are registered; the inner timestamp is `None`
    /// for a job that has not been initialized yet.
    pub fn next_run(&self) -> Option<(Job, Option<DateTime<Utc>>)> {
        self.core.lock().registry.next_run()
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.core.lock().registry.len()
    }

    /// Whether no jobs are registered.
    pub fn is_empty(&self) -> bool {
        self.core.lock().registry.is_empty()
    }

    /// Snapshot of the registry in storage order (ascending interval).
    pub fn jobs(&self) -> Vec<Job> {
        self.core.lock().registry.iter().cloned().collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// One iteration of the tick body: drain the emergency queue, then visit
/// every job in due order, initializing stragglers and running whatever is
/// due. Job bodies execute while the core lock is held; a panicking body
/// propagates to the caller.
fn process_tick(core: &mut Core, now: DateTime<Utc>) {
    let emergency = std::mem::take(&mut core.emergency);
    for job in &emergency {
        debug!("running emergency job");
        job.run();
    }

    for job in core.registry.due_order() {
        if !job.is_initialized() {
            job.initialize(now);
        }
        if job.should_run(now) {
            job.run();
        }
    }
}

/// Clears `is_running` when the loop exits, on cancellation and when a
/// panicking job body unwinds the loop task alike.
struct RunningFlag(Arc<Mutex<Core>>);

impl Drop for RunningFlag {
    fn drop(&mut self) {
        self.0.lock().is_running = false;
    }
}

/// The background execution loop.
///
/// On its first tick it initializes every not-yet-initialized job against
/// that tick's timestamp, so all jobs are phase-aligned to the loop rather
/// than to their registration times; it then flips `is_running`, processes
/// the tick, and only then confirms to `start`. The exit itself is the
/// stop acknowledgement.
async fn run_loop(
    core: Arc<Mutex<Core>>,
    period: Duration,
    cancel: CancellationToken,
    started: oneshot::Sender<()>,
) {
    let _flag = RunningFlag(Arc::clone(&core));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut started = Some(started);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                return;
            }
            _ = ticker.tick() => {
                let now = Utc::now();
                {
                    let mut core = core.lock();
                    if !core.is_running {
                        for job in core.registry.iter() {
                            if !job.is_initialized() {
                                job.initialize(now);
                            }
                        }
                        core.is_running = true;
                        debug!(jobs = core.registry.len(), "first tick initialized jobs");
                    }
                    process_tick(&mut core, now);
                }
                if let Some(tx) = started.take() {
                    let _ = tx.send(());
                }
            }
        }
    }
}

static DEFAULT: Lazy<Scheduler> = Lazy::new(Scheduler::new);

/// The process-wide default scheduler, constructed at first use and never
/// torn down.
///
/// Convenience for small programs; larger applications should construct
/// their own [`Scheduler`] and pass it explicitly.
pub fn default_scheduler() -> &'static Scheduler {
    &DEFAULT
}
