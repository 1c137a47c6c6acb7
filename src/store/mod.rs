//! Table-oriented persistence for snapshots, course listings and logs.
//!
//! Handlers and fetchers only see the [`SnapshotStore`] trait, so the
//! Postgres implementation can be swapped for the in-memory one in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{
    CommitSnapshot, ContactSubmission, Course, CronLogEntry, CronStatus, SubmissionSnapshot,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const COMMITS_TABLE: &str = "github_commits";
pub const SUBMISSIONS_TABLE: &str = "leetcode_submissions";
pub const COURSES_TABLE: &str = "datacamp_courses";
pub const CRON_LOGS_TABLE: &str = "cron_logs";
pub const CONTACTS_TABLE: &str = "contact_submissions";

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replaces the whole commit table with `commits`, keeping their order
    async fn replace_commits(&self, commits: &[CommitSnapshot]) -> Result<(), StoreError>;

    /// Stored commits in snapshot order, at most `limit` when given
    async fn list_commits(&self, limit: Option<i64>) -> Result<Vec<CommitSnapshot>, StoreError>;

    /// Replaces the whole submission table with `submissions`, keeping their order
    async fn replace_submissions(
        &self,
        submissions: &[SubmissionSnapshot],
    ) -> Result<(), StoreError>;

    async fn list_submissions(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<SubmissionSnapshot>, StoreError>;

    /// Courses, most recently completed first
    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;

    async fn record_cron_run(&self, entry: &CronLogEntry) -> Result<(), StoreError>;

    async fn record_contact(&self, submission: &ContactSubmission) -> Result<(), StoreError>;

    /// Returns true if the backing store is reachable
    async fn ping(&self) -> bool;
}

/// Writes an execution record. Failures are logged and swallowed.
pub async fn log_cron_run(
    store: &dyn SnapshotStore,
    job_name: &str,
    status: CronStatus,
    details: serde_json::Value,
) {
    let entry = CronLogEntry::new(job_name, status, details);
    if let Err(e) = store.record_cron_run(&entry).await {
        log::error!("Failed to record {} run: {}", job_name, e);
    }
}
