//! Ordered job storage with a name index.
//!
//! The registry keeps two views of its jobs consistent: the ordered
//! sequence (sorted ascending by interval after every insertion) and the
//! name index (at most one job per name). Removing through either view
//! removes from both.
//!
//! The registry is not internally synchronized; the scheduler guards it
//! with its single coarse lock.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use metronome_job::Job;

/// Ordered collection of jobs plus a name index.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Vec<Job>,
    by_name: HashMap<String, Job>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job, keeping the sequence sorted ascending by interval.
    /// Equal intervals keep their prior relative order.
    pub fn add(&mut self, job: Job) {
        self.jobs.push(job);
        // stable, and the vec is already sorted apart from the tail element
        self.jobs.sort_by_key(Job::interval);
    }

    /// Insert a job under a name.
    ///
    /// An existing job under the same name is evicted first, as if removed
    /// and re-added.
    pub fn add_named(&mut self, name: &str, job: Job) {
        if let Some(old) = self.by_name.remove(name) {
            self.jobs.retain(|j| !j.same_job(&old));
        }
        self.by_name.insert(name.to_string(), job.clone());
        self.add(job);
    }

    /// Remove a job by handle identity, preserving the order of the
    /// remaining jobs. Returns whether the job was present.
    pub fn remove(&mut self, job: &Job) -> bool {
        let Some(position) = self.jobs.iter().position(|j| j.same_job(job)) else {
            return false;
        };
        self.jobs.remove(position);
        self.by_name.retain(|_, j| !j.same_job(job));
        true
    }

    /// Remove the job registered under `name`. Returns whether it existed.
    pub fn remove_named(&mut self, name: &str) -> bool {
        match self.by_name.remove(name) {
            Some(job) => {
                self.jobs.retain(|j| !j.same_job(&job));
                true
            }
            None => false,
        }
    }

    /// Update the interval of the job registered under `name`. Returns
    /// whether it existed.
    ///
    /// Storage order is deliberately not re-sorted here: it is refreshed by
    /// the next insertion, and the due-order query does not depend on it.
    pub fn update_interval(&mut self, name: &str, interval: u64) -> bool {
        match self.by_name.get(name) {
            Some(job) => {
                job.update_interval(interval);
                true
            }
            None => false,
        }
    }

    /// Pause the job registered under `name`. Returns whether it existed.
    pub fn pause_named(&self, name: &str) -> bool {
        match self.by_name.get(name) {
            Some(job) => {
                job.pause();
                true
            }
            None => false,
        }
    }

    /// Resume the job registered under `name`. Returns whether it existed.
    pub fn resume_named(&self, name: &str) -> bool {
        match self.by_name.get(name) {
            Some(job) => {
                job.resume();
                true
            }
            None => false,
        }
    }

    /// Pause every job in the registry.
    pub fn pause_all(&self) {
        for job in &self.jobs {
            job.pause();
        }
    }

    /// Resume every job in the registry.
    pub fn resume_all(&self) {
        for job in &self.jobs {
            job.resume();
        }
    }

    /// Discard the sequence and the name index together.
    pub fn clear(&mut self) {
        self.jobs.clear();
        self.by_name.clear();
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the registry holds no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Iterate the jobs in storage order (ascending interval).
    pub fn iter(&self) -> std::slice::Iter<'_, Job> {
        self.jobs.iter()
    }

    /// Fresh due-time ordering over the current jobs: handles sorted
    /// ascending by `next_run`, uninitialized jobs first, ties keeping
    /// storage order.
    ///
    /// This order is computed per call and never written back into storage
    /// order; storage order and due order stay independent.
    pub fn due_order(&self) -> Vec<Job> {
        let mut order = self.jobs.clone();
        order.sort_by_key(|job| job.next_run().unwrap_or(DateTime::<Utc>::MIN_UTC));
        order
    }

    /// The soonest-due job and its next run time.
    ///
    /// `None` when the registry is empty; the inner timestamp is `None` for
    /// a job that has not been initialized yet.
    pub fn next_run(&self) -> Option<(Job, Option<DateTime<Utc>>)> {
        let job = self.due_order().into_iter().next()?;
        let next = job.next_run();
        Some((job, next))
    }
}
