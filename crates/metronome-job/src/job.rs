//! The schedulable job unit.
//!
//! A [`Job`] owns its due-time state (`last_run`/`next_run`), an enabled
//! flag, and the bound callable. The scheduler decides *when* to invoke a
//! job; the job decides what "due" means for its interval, unit, and
//! optional time-of-day or weekday anchor.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use parking_lot::Mutex;
use tracing::debug;

use crate::{JobError, TimeOfDay, TimeUnit};

/// The bound callable. Arguments are captured by the closure.
pub type Task = Box<dyn FnMut() + Send>;

struct JobInner {
    interval: u64,
    unit: TimeUnit,
    at: Option<TimeOfDay>,
    weekday: Option<Weekday>,
    last_run: Option<DateTime<Utc>>,
    next_run: Option<DateTime<Utc>>,
    enabled: bool,
    location: Tz,
    task: Option<Task>,
}

impl JobInner {
    fn period(&self) -> Duration {
        self.unit.period(self.interval)
    }

    /// Day- and week-based schedules with a time-of-day or weekday anchor
    /// snap to wall-clock times; everything else is purely periodic.
    fn anchored(&self) -> bool {
        matches!(self.unit, TimeUnit::Days | TimeUnit::Weeks)
            && (self.at.is_some() || self.weekday.is_some())
    }

    /// Compute `(last_run, next_run)` anchored to `now`.
    ///
    /// Periodic schedules start a full period from `now`. Anchored schedules
    /// pick the first matching wall-clock instant strictly after `now` (in
    /// the job's location) and back-date `last_run` one period before it.
    fn schedule_from(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let period = self.period();
        if !self.anchored() {
            return (now, clamp_add(now, period));
        }

        let local = now.with_timezone(&self.location);
        let at = self.at.unwrap_or(TimeOfDay::MIDNIGHT);
        let step_days = if self.weekday.is_some() { 7 } else { 1 };
        let mut date = local.date_naive();
        if let Some(weekday) = self.weekday {
            let offset = i64::from(weekday.num_days_from_monday())
                - i64::from(local.weekday().num_days_from_monday());
            date = date + Duration::days(offset);
        }

        loop {
            match self.resolve_local(date, at) {
                // a local time erased by a DST gap just moves to the next
                // candidate date
                Some(next) if next > now => return (clamp_sub(next, period), next),
                _ => date = date + Duration::days(step_days),
            }
        }
    }

    fn resolve_local(&self, date: NaiveDate, at: TimeOfDay) -> Option<DateTime<Utc>> {
        let naive = date.and_hms_opt(at.hour, at.minute, 0)?;
        self.location
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Advance one period, phase-stable: the new `next_run` is the old one
    /// plus a period, not `now` plus a period.
    fn advance(&mut self, now: DateTime<Utc>) {
        let base = self.next_run.unwrap_or(now);
        self.last_run = Some(base);
        self.next_run = Some(clamp_add(base, self.period()));
    }
}

/// Shift a timestamp, pinning at chrono's range instead of overflowing. A
/// saturated period keeps the job scheduled, just never due again.
fn clamp_add(base: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    base.checked_add_signed(period)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn clamp_sub(base: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    base.checked_sub_signed(period)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A schedulable unit of repeated work.
///
/// `Job` is a handle: clones are cheap and share the same underlying job.
/// Two handles compare equal exactly when they refer to the same job.
///
/// Configuration is fluent; the callable is bound last:
///
/// ```
/// use chrono::Weekday;
/// use metronome_job::Job;
///
/// # fn main() -> Result<(), metronome_job::JobError> {
/// let every_ten_minutes = Job::new(10).minutes().with_task(|| println!("ping"));
/// let weekly = Job::new(1)
///     .weekday(Weekday::Mon)
///     .at("18:30")?
///     .with_task(|| println!("weekly report"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Job {
    inner: Arc<Mutex<JobInner>>,
}

impl Job {
    /// Create a job repeating every `interval` units (seconds by default).
    ///
    /// A zero interval is accepted and yields an always-due job.
    pub fn new(interval: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(JobInner {
                interval,
                unit: TimeUnit::Seconds,
                at: None,
                weekday: None,
                last_run: None,
                next_run: None,
                enabled: true,
                location: chrono_tz::UTC,
                task: None,
            })),
        }
    }

    fn configure(self, f: impl FnOnce(&mut JobInner)) -> Self {
        f(&mut self.inner.lock());
        self
    }

    /// Count the interval in seconds (the default).
    pub fn seconds(self) -> Self {
        self.configure(|job| job.unit = TimeUnit::Seconds)
    }

    /// Count the interval in minutes.
    pub fn minutes(self) -> Self {
        self.configure(|job| job.unit = TimeUnit::Minutes)
    }

    /// Count the interval in hours.
    pub fn hours(self) -> Self {
        self.configure(|job| job.unit = TimeUnit::Hours)
    }

    /// Count the interval in days.
    pub fn days(self) -> Self {
        self.configure(|job| job.unit = TimeUnit::Days)
    }

    /// Count the interval in weeks.
    pub fn weeks(self) -> Self {
        self.configure(|job| job.unit = TimeUnit::Weeks)
    }

    /// Pin the job to a weekday. Implies a weekly unit; without [`at`](Job::at)
    /// the schedule anchors to midnight.
    pub fn weekday(self, weekday: Weekday) -> Self {
        self.configure(|job| {
            job.unit = TimeUnit::Weeks;
            job.weekday = Some(weekday);
        })
    }

    /// Anchor a day- or week-based schedule to a wall-clock `"HH:MM"` time
    /// in the job's location.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidTimeOfDay`] when `time` does not parse.
    pub fn at(self, time: &str) -> Result<Self, JobError> {
        let at = time.parse()?;
        Ok(self.configure(|job| job.at = Some(at)))
    }

    /// Set the location used for time-of-day computation.
    pub fn with_location(self, location: Tz) -> Self {
        self.configure(|job| job.location = location)
    }

    /// Bind the callable. Arguments are captured by the closure.
    pub fn with_task(self, task: impl FnMut() + Send + 'static) -> Self {
        self.configure(|job| job.task = Some(Box::new(task)))
    }

    /// True once `initialize` has anchored the schedule.
    pub fn is_initialized(&self) -> bool {
        self.inner.lock().next_run.is_some()
    }

    /// Anchor `last_run`/`next_run` to `now`.
    pub fn initialize(&self, now: DateTime<Utc>) {
        let mut inner = self.inner.lock();
        let (last, next) = inner.schedule_from(now);
        inner.last_run = Some(last);
        inner.next_run = Some(next);
    }

    /// True when the job is enabled and its next run time has been reached.
    pub fn should_run(&self, now: DateTime<Utc>) -> bool {
        let inner = self.inner.lock();
        inner.enabled && inner.next_run.is_some_and(|next| now >= next)
    }

    /// Invoke the bound callable and advance the schedule one period.
    ///
    /// The job's own lock is released around the callable so the task may
    /// use its handle. Panics from the callable are not caught.
    pub fn run(&self) {
        let mut task = {
            let mut inner = self.inner.lock();
            inner.advance(Utc::now());
            inner.task.take()
        };
        match task.as_mut() {
            Some(f) => f(),
            None => debug!("job has no bound task; schedule advanced"),
        }
        if task.is_some() {
            let mut inner = self.inner.lock();
            if inner.task.is_none() {
                inner.task = task;
            }
        }
    }

    /// Disable the job; `should_run` is false until resumed.
    pub fn pause(&self) {
        self.inner.lock().enabled = false;
    }

    /// Re-enable a paused job.
    pub fn resume(&self) {
        self.inner.lock().enabled = true;
    }

    /// Whether the job is enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Change the repeat interval.
    ///
    /// Takes effect from the next advance; the current `next_run` is left
    /// untouched.
    pub fn update_interval(&self, interval: u64) {
        self.inner.lock().interval = interval;
    }

    /// The repeat interval in units of [`Job::unit`].
    pub fn interval(&self) -> u64 {
        self.inner.lock().interval
    }

    /// The configured time unit.
    pub fn unit(&self) -> TimeUnit {
        self.inner.lock().unit
    }

    /// When the job last ran (or was back-dated to at initialization).
    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().last_run
    }

    /// When the job is next due. `None` until initialized.
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().next_run
    }

    /// Two handles are the same job when they share the underlying state.
    pub fn same_job(&self, other: &Job) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.same_job(other)
    }
}

impl Eq for Job {}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(inner) => f
                .debug_struct("Job")
                .field("interval", &inner.interval)
                .field("unit", &inner.unit)
                .field("enabled", &inner.enabled)
                .field("next_run", &inner.next_run)
                .finish_non_exhaustive(),
            None => f.write_str("Job { <locked> }"),
        }
    }
}
