//! Poll loop over a series file that an external fetcher keeps rewriting.
//!
//! Each tick reloads the file, feeds the snapshot to the highlight tracker
//! and re-projects the batch. The tracker's single pending expiry is awaited
//! alongside the tick, so clearing never blocks polling.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use eis_core::{EisPipeline, HighlightTracker};
use eis_feed::load_records;
use tokio::time::{Instant, MissedTickBehavior};

pub struct WatchOptions {
    pub interval: Duration,
    pub window: Duration,
    pub max_polls: Option<u64>,
}

pub async fn run(path: &Path, pipeline: &EisPipeline, opts: &WatchOptions) -> Result<()> {
    let mut tracker = HighlightTracker::new(opts.window);
    let mut ticker = tokio::time::interval(opts.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls: u64 = 0;

    tracing::info!(
        "watching {} every {}ms",
        path.display(),
        opts.interval.as_millis()
    );

    loop {
        let expiry = tracker.pending_expiry();
        tokio::select! {
            _ = ticker.tick() => {
                poll_once(path, pipeline, &mut tracker);
                polls += 1;
                if opts.max_polls.is_some_and(|max| polls >= max) {
                    break;
                }
            }
            _ = sleep_until(expiry) => {
                if tracker.expire(std::time::Instant::now()) {
                    println!("highlight cleared");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping watch");
                break;
            }
        }
    }
    Ok(())
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

fn poll_once(path: &Path, pipeline: &EisPipeline, tracker: &mut HighlightTracker) {
    // A failed poll only delays highlights; the next tick reconciles.
    let records = match load_records(path) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("poll failed: {e}");
            return;
        }
    };

    let before = tracker.previous_len();
    let highlighted = tracker.track_records(&records, std::time::Instant::now());
    if records.len() > before {
        println!(
            "{} new point(s): {}",
            records.len() - before,
            highlighted.join(", ")
        );
    }

    if !pipeline.validate(&records) {
        println!("processing error: invalid EIS data format");
        return;
    }
    match pipeline.process(&records) {
        Ok(p) => println!(
            "point: x={:.6} y={:.6} z={:.6} category={} ({} records)",
            p.x,
            p.y,
            p.z,
            p.category,
            records.len()
        ),
        Err(e) => println!("processing error: {e}"),
    }
}
