use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CronStatus {
    Success,
    Failure,
}

impl CronStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CronStatus::Success => "success",
            CronStatus::Failure => "failure",
        }
    }
}

/// Execution record of a scheduled job, written to `cron_logs`
#[derive(Debug, Clone, Serialize)]
pub struct CronLogEntry {
    pub job_name: String,
    pub status: CronStatus,
    pub details: serde_json::Value,
    pub executed_at: DateTime<Utc>,
}

impl CronLogEntry {
    pub fn new(job_name: &str, status: CronStatus, details: serde_json::Value) -> Self {
        Self {
            job_name: job_name.to_string(),
            status,
            details,
            executed_at: Utc::now(),
        }
    }
}
