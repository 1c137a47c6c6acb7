//! Fixed-window request limiter keyed by client identifier.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Request count of one identifier within its current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitRecord {
    fn fresh(now: DateTime<Utc>, window: Duration) -> Self {
        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        Self {
            count: 1,
            reset_at: now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.reset_at
    }
}

/// Applies one request to `record` and returns whether it is allowed.
///
/// A missing or expired record starts a new window with a count of one.
/// Within a window the count grows until it reaches `limit`; further
/// requests are denied and leave the record untouched.
pub fn admit(
    record: &mut Option<RateLimitRecord>,
    limit: u32,
    window: Duration,
    now: DateTime<Utc>,
) -> bool {
    match record {
        Some(current) if !current.is_expired(now) => {
            if current.count >= limit {
                return false;
            }
            current.count += 1;
            true
        }
        _ => {
            *record = Some(RateLimitRecord::fresh(now, window));
            true
        }
    }
}

/// Backing storage for rate limit records.
///
/// `check` must be atomic per key: a shared implementation (e.g. a cache
/// with increment-and-expire) has to apply [`admit`] semantics in one step.
pub trait RateLimitStore: Send + Sync {
    fn check(&self, key: &str, limit: u32, window: Duration, now: DateTime<Utc>) -> bool;

    /// Removes records whose window ended before `now`, returning how many
    fn sweep(&self, now: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single-process store guarded by a mutex
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<RateLimitRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(key).copied())
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    fn check(&self, key: &str, limit: u32, window: Duration, now: DateTime<Utc>) -> bool {
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => {
                log::error!("Rate limit store lock poisoned, recovering");
                poisoned.into_inner()
            }
        };

        let mut record = records.get(key).copied();
        let allowed = admit(&mut record, limit, window, now);
        if let Some(record) = record {
            records.insert(key.to_string(), record);
        }
        allowed
    }

    fn sweep(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut records) = self.records.lock() else {
            return 0;
        };
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before - records.len()
    }

    fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }
}

/// Request limiter over an injected store
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    /// Limiter backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRateLimitStore::new()))
    }

    /// Returns true if `identifier` may make another request within `window`
    pub fn allow(&self, identifier: &str, limit: u32, window: Duration) -> bool {
        self.allow_at(identifier, limit, window, Utc::now())
    }

    pub fn allow_at(
        &self,
        identifier: &str,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        self.store.check(identifier, limit, window, now)
    }

    /// Drops expired records
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        self.store.sweep(now)
    }

    /// Number of identifiers currently tracked
    pub fn tracked(&self) -> usize {
        self.store.len()
    }
}
