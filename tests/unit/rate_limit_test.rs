//! Property tests for the request limiter
//!
//! All calls use explicit timestamps, so no test depends on the wall clock.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use portfolio::services::rate_limit::{admit, RateLimitRecord};
use portfolio::services::RateLimiter;
use proptest::prelude::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

proptest! {
    /// Within one window, exactly `limit` calls are allowed and the rest denied
    #[test]
    fn prop_denies_every_call_after_limit(
        limit in 1u32..20,
        extra in 1u32..20,
        window_secs in 1u64..7200,
    ) {
        let limiter = RateLimiter::in_memory();
        let window = Duration::from_secs(window_secs);

        let total = limit + extra;
        let allowed: Vec<bool> = (0..total)
            .map(|i| {
                // Spread the calls over the window without leaving it
                let offset = TimeDelta::milliseconds((window_secs as i64 * 1000 * i as i64) / total as i64);
                limiter.allow_at("198.51.100.1", limit, window, t0() + offset)
            })
            .collect();

        prop_assert!(allowed[..limit as usize].iter().all(|a| *a));
        prop_assert!(allowed[limit as usize..].iter().all(|a| !*a));
    }

    /// After the window elapses, the next call opens a new window with count 1
    #[test]
    fn prop_window_expiry_resets_count(
        limit in 1u32..10,
        window_secs in 1u64..7200,
        after_secs in 1i64..10_000,
    ) {
        let mut record: Option<RateLimitRecord> = None;
        let window = Duration::from_secs(window_secs);

        for _ in 0..limit + 3 {
            admit(&mut record, limit, window, t0());
        }

        let later = t0() + TimeDelta::seconds(window_secs as i64 + after_secs);
        prop_assert!(admit(&mut record, limit, window, later));

        let record = record.unwrap();
        prop_assert_eq!(record.count, 1);
        prop_assert_eq!(record.reset_at, later + TimeDelta::seconds(window_secs as i64));
    }

    /// Identifiers never affect each other's budget
    #[test]
    fn prop_identifiers_are_isolated(limit in 1u32..10, noisy_calls in 0u32..50) {
        let limiter = RateLimiter::in_memory();
        let window = Duration::from_secs(60);

        for _ in 0..noisy_calls {
            limiter.allow_at("noisy", limit, window, t0());
        }

        prop_assert!(limiter.allow_at("quiet", limit, window, t0()));
    }
}

#[test]
fn test_sweep_bounds_tracked_identifiers() {
    let limiter = RateLimiter::in_memory();
    let window = Duration::from_secs(60);

    for i in 0..100 {
        limiter.allow_at(&format!("10.0.0.{}", i), 5, window, t0());
    }
    assert_eq!(limiter.tracked(), 100);

    // Nothing has expired yet
    assert_eq!(limiter.sweep_at(t0() + TimeDelta::seconds(60)), 0);

    assert_eq!(limiter.sweep_at(t0() + TimeDelta::seconds(61)), 100);
    assert_eq!(limiter.tracked(), 0);
}
