use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One judge submission, as stored in `leetcode_submissions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SubmissionSnapshot {
    pub problem_name: String,
    pub submission_date: DateTime<Utc>,
    pub submission_status: String,
}
