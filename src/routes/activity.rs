use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::services::{GitHubFetcher, LeetCodeFetcher};
use crate::store::SnapshotStore;

/// One hour, matching how often the upstream data is refreshed
pub const READ_MAX_AGE: u32 = 3600;

pub(crate) fn cached() -> CacheControl {
    CacheControl(vec![
        CacheDirective::Public,
        CacheDirective::MaxAge(READ_MAX_AGE),
    ])
}

/// GET /api/recent-commits - Live GitHub activity, empty when unavailable
pub async fn recent_commits(github: web::Data<GitHubFetcher>) -> HttpResponse {
    if !github.is_configured() {
        log::warn!("GitHub credentials not configured, returning no commits");
        return HttpResponse::Ok().insert_header(cached()).json(json!([]));
    }

    match github.collect().await {
        Ok(commits) => HttpResponse::Ok().insert_header(cached()).json(commits),
        Err(e) => {
            log::error!("Error fetching GitHub commits: {}", e);
            HttpResponse::Ok().json(json!([]))
        }
    }
}

/// GET /api/leetcode-submissions - Live LeetCode submissions
pub async fn leetcode_submissions(leetcode: web::Data<LeetCodeFetcher>) -> HttpResponse {
    if !leetcode.is_configured() {
        log::warn!("LeetCode username not configured, returning no submissions");
        return HttpResponse::Ok().insert_header(cached()).json(json!([]));
    }

    match leetcode.collect().await {
        Ok(submissions) => HttpResponse::Ok().insert_header(cached()).json(submissions),
        Err(e) => {
            log::error!("Error fetching LeetCode submissions: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to fetch submissions" }))
        }
    }
}

/// GET /api/datacamp-courses - Completed courses, most recent first
pub async fn datacamp_courses(store: web::Data<dyn SnapshotStore>) -> HttpResponse {
    match store.list_courses().await {
        Ok(courses) => HttpResponse::Ok().insert_header(cached()).json(courses),
        Err(e) => {
            log::error!("Error fetching DataCamp courses: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to fetch courses" }))
        }
    }
}

/// GET /api/test-db - Store connectivity probe returning one stored commit
pub async fn test_db(store: web::Data<dyn SnapshotStore>) -> HttpResponse {
    match store.list_commits(Some(1)).await {
        Ok(sample) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Database connection successful",
            "sampleData": sample,
        })),
        Err(e) => {
            log::error!("Database probe failed: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Database connection failed",
                "error": e.to_string(),
            }))
        }
    }
}

/// Configure activity routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/recent-commits", web::get().to(recent_commits))
        .route("/api/leetcode-submissions", web::get().to(leetcode_submissions))
        .route("/api/datacamp-courses", web::get().to(datacamp_courses))
        .route("/api/test-db", web::get().to(test_db));
}
