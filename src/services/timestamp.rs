//! Normalization of upstream timestamps.
//!
//! Upstream APIs report dates either as strings or as Unix epochs whose unit
//! (seconds or milliseconds) is not stated. Anything unusable resolves to
//! `now` so one odd item never fails a whole fetch cycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Epoch values below this are seconds, values at or above it are milliseconds
pub const MILLIS_THRESHOLD: i64 = 10_000_000_000;

pub fn normalize_timestamp(raw: Option<&Value>, now: DateTime<Utc>) -> DateTime<Utc> {
    let resolved = match raw {
        Some(Value::Number(n)) => {
            if let Some(epoch) = n.as_i64() {
                from_epoch(epoch)
            } else {
                n.as_f64().and_then(from_fractional_epoch)
            }
        }
        Some(Value::String(s)) => parse_str(s),
        _ => None,
    };

    resolved.unwrap_or_else(|| {
        log::debug!("Unusable timestamp {:?}, falling back to current time", raw);
        now
    })
}

/// Parses a string timestamp: integral strings are epochs, otherwise RFC 3339
/// or a bare `YYYY-MM-DD` date (midnight UTC)
pub fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(epoch) = s.parse::<i64>() {
        return from_epoch(epoch);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn from_epoch(epoch: i64) -> Option<DateTime<Utc>> {
    // Zero is treated as "missing", like an absent field
    if epoch == 0 {
        return None;
    }

    if epoch < MILLIS_THRESHOLD {
        DateTime::from_timestamp(epoch, 0)
    } else {
        DateTime::from_timestamp_millis(epoch)
    }
}

fn from_fractional_epoch(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() || epoch == 0.0 {
        return None;
    }

    let millis = if epoch < MILLIS_THRESHOLD as f64 {
        epoch * 1000.0
    } else {
        epoch
    };

    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}
