use async_trait::async_trait;
use ipnetwork::IpNetwork;
use sqlx::PgPool;

use super::{
    SnapshotStore, COMMITS_TABLE, CONTACTS_TABLE, COURSES_TABLE, CRON_LOGS_TABLE,
    SUBMISSIONS_TABLE,
};
use crate::error::StoreError;
use crate::models::{
    CommitSnapshot, ContactSubmission, Course, CronLogEntry, SubmissionSnapshot,
};

/// Postgres-backed store. Table replacement runs in a single transaction,
/// so readers never observe an empty table between delete and insert.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SnapshotStore for PgStore {
    async fn replace_commits(&self, commits: &[CommitSnapshot]) -> Result<(), StoreError> {
        let write = |e: sqlx::Error| StoreError::write(COMMITS_TABLE, e);

        let mut tx = self.pool.begin().await.map_err(write)?;

        sqlx::query("DELETE FROM github_commits")
            .execute(&mut *tx)
            .await
            .map_err(write)?;

        for (position, commit) in commits.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO github_commits (
                    position, name, description, last_commit_message,
                    date, url, stars, forks, language
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(position as i32)
            .bind(&commit.name)
            .bind(&commit.description)
            .bind(&commit.last_commit_message)
            .bind(commit.date)
            .bind(&commit.url)
            .bind(commit.stars)
            .bind(commit.forks)
            .bind(&commit.language)
            .execute(&mut *tx)
            .await
            .map_err(write)?;
        }

        tx.commit().await.map_err(write)?;
        Ok(())
    }

    async fn list_commits(&self, limit: Option<i64>) -> Result<Vec<CommitSnapshot>, StoreError> {
        // LIMIT NULL means no limit in Postgres
        sqlx::query_as::<_, CommitSnapshot>(
            r#"
            SELECT name, description, last_commit_message, date, url, stars, forks, language
            FROM github_commits
            ORDER BY position ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::read(COMMITS_TABLE, e))
    }

    async fn replace_submissions(
        &self,
        submissions: &[SubmissionSnapshot],
    ) -> Result<(), StoreError> {
        let write = |e: sqlx::Error| StoreError::write(SUBMISSIONS_TABLE, e);

        let mut tx = self.pool.begin().await.map_err(write)?;

        sqlx::query("DELETE FROM leetcode_submissions")
            .execute(&mut *tx)
            .await
            .map_err(write)?;

        for (position, submission) in submissions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO leetcode_submissions (
                    position, problem_name, submission_date, submission_status
                )
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(position as i32)
            .bind(&submission.problem_name)
            .bind(submission.submission_date)
            .bind(&submission.submission_status)
            .execute(&mut *tx)
            .await
            .map_err(write)?;
        }

        tx.commit().await.map_err(write)?;
        Ok(())
    }

    async fn list_submissions(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<SubmissionSnapshot>, StoreError> {
        sqlx::query_as::<_, SubmissionSnapshot>(
            r#"
            SELECT problem_name, submission_date, submission_status
            FROM leetcode_submissions
            ORDER BY position ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::read(SUBMISSIONS_TABLE, e))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        sqlx::query_as::<_, Course>(
            r#"
            SELECT id, course_title, course_description, date_completed,
                   certificate_url, image_url
            FROM datacamp_courses
            ORDER BY date_completed DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::read(COURSES_TABLE, e))
    }

    async fn record_cron_run(&self, entry: &CronLogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cron_logs (job_name, status, details, executed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&entry.job_name)
        .bind(entry.status.as_str())
        .bind(&entry.details)
        .bind(entry.executed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(CRON_LOGS_TABLE, e))?;

        Ok(())
    }

    async fn record_contact(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        // "unknown" and other non-IP identifiers are stored as NULL
        let ip: Option<IpNetwork> = submission.ip_address.parse().ok();

        sqlx::query(
            r#"
            INSERT INTO contact_submissions (name, email, message, ip_address)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&submission.message.name)
        .bind(&submission.message.email)
        .bind(&submission.message.message)
        .bind(ip)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::write(CONTACTS_TABLE, e))?;

        Ok(())
    }

    async fn ping(&self) -> bool {
        crate::db::health_check(&self.pool).await
    }
}
