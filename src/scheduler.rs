//! Background tasks: the built-in refresh timer and the rate limiter sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::models::CronStatus;
use crate::services::{RateLimiter, Refresher};
use crate::store::{log_cron_run, SnapshotStore};

pub const SCHEDULED_JOB_NAME: &str = "scheduled-refresh";

/// Shortest period a background task will tick at
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Interval starting one period from now. `interval_at` panics on a zero
/// period, so anything below `MIN_PERIOD` is raised to it.
fn period_ticker(period: Duration) -> Interval {
    let period = if period < MIN_PERIOD {
        log::warn!("Background task period {:?} is too short, using {:?}", period, MIN_PERIOD);
        MIN_PERIOD
    } else {
        period
    };

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Runs one timer-driven refresh and records it in the execution log
pub async fn run_scheduled_refresh(refresher: &Refresher, store: &dyn SnapshotStore) {
    let summary = refresher.refresh_all().await;
    let status = if summary.all_succeeded() {
        CronStatus::Success
    } else {
        CronStatus::Failure
    };

    let details = serde_json::to_value(&summary).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("Failed to serialize summary: {}", e) })
    });

    log_cron_run(store, SCHEDULED_JOB_NAME, status, details).await;
}

/// Refreshes every `period`, starting one period after launch
pub fn spawn_refresh_timer(
    refresher: Refresher,
    store: Arc<dyn SnapshotStore>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = period_ticker(period);

        loop {
            ticker.tick().await;
            log::info!("Running timer-driven data refresh...");
            run_scheduled_refresh(&refresher, store.as_ref()).await;
        }
    })
}

/// Drops expired rate limit records every `period`
pub fn spawn_rate_limit_sweeper(limiter: RateLimiter, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = period_ticker(period);

        loop {
            ticker.tick().await;
            let removed = limiter.sweep();
            if removed > 0 {
                log::debug!(
                    "Rate limiter sweep removed {} records ({} still tracked)",
                    removed,
                    limiter.tracked()
                );
            }
        }
    })
}
