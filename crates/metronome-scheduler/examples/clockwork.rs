//! Small clockwork-style demo: a couple of periodic jobs, one named job,
//! and an emergency job that fires once on the next tick.
//!
//! Run with `cargo run --example clockwork`.

use std::time::Duration;

use metronome_scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let scheduler = Scheduler::new();

    scheduler
        .every(1)
        .seconds()
        .with_task(|| println!("every second"));

    let greeted = "world";
    scheduler
        .every_named(2, "greeter")
        .seconds()
        .with_task(move || println!("hello, {greeted}!"));

    scheduler
        .every(1)
        .days()
        .at("10:30")?
        .with_task(|| println!("daily digest"));

    scheduler
        .emergency()
        .with_task(|| println!("emergency job: once, soon"));

    scheduler.start().await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    println!("removing the greeter: {}", scheduler.remove_named("greeter"));
    tokio::time::sleep(Duration::from_secs(3)).await;

    scheduler.stop().await;
    Ok(())
}
