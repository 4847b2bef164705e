//! Registry-facing surface tests: storage ordering, name addressing, and
//! the next-run query.

use chrono::Timelike;
use chrono_tz::Tz;
use pretty_assertions::assert_eq;

use e2e_tests::Probe;
use metronome_scheduler::{Job, Scheduler};

fn intervals(scheduler: &Scheduler) -> Vec<u64> {
    scheduler.jobs().iter().map(Job::interval).collect()
}

#[test]
fn test_registry_sorts_ascending_by_interval() {
    let scheduler = Scheduler::new();
    for interval in [3, 2, 5, 1, 1, 500, 10] {
        scheduler.every(interval).seconds();
    }
    assert_eq!(intervals(&scheduler), vec![1, 1, 2, 3, 5, 10, 500]);
}

#[test]
fn test_remove_middle_job_by_handle() {
    let scheduler = Scheduler::new();
    let first = scheduler.every(3).seconds();
    let middle = scheduler.every(2).seconds();
    let last = scheduler.every(1).seconds();

    assert!(scheduler.remove(&middle));
    assert_eq!(scheduler.len(), 2);

    let remaining = scheduler.jobs();
    assert!(remaining.iter().all(|j| !j.same_job(&middle)));
    assert!(remaining.iter().any(|j| j.same_job(&first)));
    assert!(remaining.iter().any(|j| j.same_job(&last)));

    assert!(!scheduler.remove(&middle));
}

#[test]
fn test_named_registration_replaces() {
    let scheduler = Scheduler::new();
    scheduler.every(1).seconds();
    scheduler.every_named(5, "x").seconds();
    let len_before = scheduler.len();

    scheduler.every_named(7, "x").seconds();
    assert_eq!(scheduler.len(), len_before);

    let with_seven: Vec<u64> = intervals(&scheduler);
    assert!(with_seven.contains(&7));
    assert!(!with_seven.contains(&5));

    assert!(scheduler.remove_named("x"));
    assert!(!scheduler.remove_named("x"));
}

#[test]
fn test_update_interval_keeps_storage_order() {
    let scheduler = Scheduler::new();
    scheduler.every_named(1, "a").seconds();
    scheduler.every(5).seconds();

    assert!(scheduler.update_interval_named("a", 50));
    // storage order goes stale until the next insertion re-sorts
    assert_eq!(intervals(&scheduler), vec![50, 5]);

    scheduler.every(2).seconds();
    assert_eq!(intervals(&scheduler), vec![2, 5, 50]);

    assert!(!scheduler.update_interval_named("missing", 1));
}

#[test]
fn test_next_run_on_empty_scheduler() {
    let scheduler = Scheduler::new();
    assert!(scheduler.next_run().is_none());
}

#[test]
fn test_next_run_prefers_soonest_due() {
    let scheduler = Scheduler::new();
    scheduler.every(3600).seconds();
    let soon = scheduler.every(1).seconds();

    scheduler.run_pending(); // initializes both
    let (job, next) = scheduler.next_run().expect("jobs are registered");
    assert!(job.same_job(&soon));
    assert_eq!(next, soon.next_run());
}

#[test]
fn test_clear_empties_registry() {
    let scheduler = Scheduler::new();
    scheduler.every(1).seconds();
    scheduler.every_named(2, "x").seconds();

    scheduler.clear();
    assert_eq!(scheduler.len(), 0);
    assert!(scheduler.next_run().is_none());
    assert!(!scheduler.remove_named("x"));
}

#[test]
fn test_pause_all_and_resume_all() {
    let scheduler = Scheduler::new();
    let probe = Probe::new();
    scheduler.every(0).seconds().with_task(probe.task());
    scheduler.every_named(0, "x").seconds().with_task(probe.task());

    scheduler.pause_all();
    scheduler.run_pending();
    assert_eq!(probe.hits(), 0);

    scheduler.resume_all();
    scheduler.run_pending();
    assert_eq!(probe.hits(), 2);
}

#[test]
fn test_location_applies_to_new_jobs() {
    let new_york: Tz = "America/New_York".parse().expect("valid timezone");
    let scheduler = Scheduler::new();
    scheduler.set_location(new_york);

    let job = scheduler
        .every(1)
        .days()
        .at("10:30")
        .expect("valid time of day");
    scheduler.run_pending(); // initializes the job

    let next = job.next_run().expect("initialized");
    let local = next.with_timezone(&new_york);
    assert_eq!((local.hour(), local.minute()), (10, 30));
}
