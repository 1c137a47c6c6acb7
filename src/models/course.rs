use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Completed DataCamp course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub course_title: String,
    pub course_description: String,
    pub date_completed: NaiveDate,
    pub certificate_url: Option<String>,
    pub image_url: Option<String>,
}
