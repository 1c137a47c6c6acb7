use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Latest activity of one repository, as stored in `github_commits`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CommitSnapshot {
    pub name: String,
    pub description: String,
    pub last_commit_message: String,
    pub date: DateTime<Utc>,
    pub url: String,
    pub stars: i64,
    pub forks: i64,
    pub language: String,
}
