use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{
    SnapshotStore, COMMITS_TABLE, CONTACTS_TABLE, COURSES_TABLE, CRON_LOGS_TABLE,
    SUBMISSIONS_TABLE,
};
use crate::error::StoreError;
use crate::models::{
    CommitSnapshot, ContactSubmission, Course, CronLogEntry, SubmissionSnapshot,
};

#[derive(Debug, Default)]
struct Tables {
    commits: Vec<CommitSnapshot>,
    submissions: Vec<SubmissionSnapshot>,
    courses: Vec<Course>,
    cron_logs: Vec<CronLogEntry>,
    contacts: Vec<ContactSubmission>,
}

/// Process-local store. Reads and writes can be made to fail to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_courses(courses: Vec<Course>) -> Self {
        let store = Self::default();
        if let Ok(mut tables) = store.tables.lock() {
            tables.courses = courses;
        }
        store
    }

    /// Makes every subsequent write fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent read fail (or succeed again)
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn cron_logs(&self) -> Vec<CronLogEntry> {
        self.tables
            .lock()
            .map(|t| t.cron_logs.clone())
            .unwrap_or_default()
    }

    pub fn contacts(&self) -> Vec<ContactSubmission> {
        self.tables
            .lock()
            .map(|t| t.contacts.clone())
            .unwrap_or_default()
    }

    fn lock(&self, table: &'static str) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::read(table, "reads disabled"));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::read(table, "store lock poisoned"))
    }

    fn lock_for_write(&self, table: &'static str) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::write(table, "writes disabled"));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::write(table, "store lock poisoned"))
    }
}

fn take_limit<T: Clone>(rows: &[T], limit: Option<i64>) -> Vec<T> {
    match limit {
        Some(n) => rows.iter().take(n.max(0) as usize).cloned().collect(),
        None => rows.to_vec(),
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn replace_commits(&self, commits: &[CommitSnapshot]) -> Result<(), StoreError> {
        self.lock_for_write(COMMITS_TABLE)?.commits = commits.to_vec();
        Ok(())
    }

    async fn list_commits(&self, limit: Option<i64>) -> Result<Vec<CommitSnapshot>, StoreError> {
        Ok(take_limit(&self.lock(COMMITS_TABLE)?.commits, limit))
    }

    async fn replace_submissions(
        &self,
        submissions: &[SubmissionSnapshot],
    ) -> Result<(), StoreError> {
        self.lock_for_write(SUBMISSIONS_TABLE)?.submissions = submissions.to_vec();
        Ok(())
    }

    async fn list_submissions(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<SubmissionSnapshot>, StoreError> {
        Ok(take_limit(&self.lock(SUBMISSIONS_TABLE)?.submissions, limit))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let mut courses = self.lock(COURSES_TABLE)?.courses.clone();
        courses.sort_by(|a, b| b.date_completed.cmp(&a.date_completed));
        Ok(courses)
    }

    async fn record_cron_run(&self, entry: &CronLogEntry) -> Result<(), StoreError> {
        self.lock_for_write(CRON_LOGS_TABLE)?
            .cron_logs
            .push(entry.clone());
        Ok(())
    }

    async fn record_contact(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        self.lock_for_write(CONTACTS_TABLE)?
            .contacts
            .push(submission.clone());
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}
