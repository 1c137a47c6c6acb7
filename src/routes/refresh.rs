use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{web, HttpResponse};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use crate::auth::{CronAuth, RefreshAuth};
use crate::models::CronStatus;
use crate::services::{RefreshOutcome, RefreshSummary, Refresher, Source};
use crate::store::{log_cron_run, SnapshotStore};

pub const CRON_JOB_NAME: &str = "refresh-data";

fn no_store() -> CacheControl {
    CacheControl(vec![CacheDirective::NoStore])
}

/// Per-source part of a manual refresh response
#[derive(Debug, Serialize)]
pub struct SourceResult {
    pub count: usize,
    pub error: Option<String>,
}

impl From<&RefreshOutcome> for SourceResult {
    fn from(outcome: &RefreshOutcome) -> Self {
        Self {
            count: outcome.count(),
            error: outcome.error().map(String::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshAllResponse {
    pub success: bool,
    pub message: &'static str,
    pub github: SourceResult,
    pub leetcode: SourceResult,
}

/// GET /api/refresh-all - Refresh both sources
pub async fn refresh_all(refresher: web::Data<Refresher>, _auth: RefreshAuth) -> HttpResponse {
    let summary = refresher.refresh_all().await;

    HttpResponse::Ok()
        .insert_header(no_store())
        .json(RefreshAllResponse {
            success: true,
            message: "Data refresh completed",
            github: (&summary.github).into(),
            leetcode: (&summary.leetcode).into(),
        })
}

async fn refresh_one(refresher: &Refresher, source: Source) -> HttpResponse {
    let outcome = refresher.refresh_source(source).await;
    let message = format!("{} data refresh completed", source.label());

    HttpResponse::Ok().insert_header(no_store()).json(json!({
        "success": outcome.is_success(),
        "message": message,
        source.key(): SourceResult::from(&outcome),
    }))
}

/// GET /api/refresh-github - Refresh the GitHub snapshot only
pub async fn refresh_github(refresher: web::Data<Refresher>, _auth: RefreshAuth) -> HttpResponse {
    refresh_one(&refresher, Source::GitHub).await
}

/// GET /api/refresh-leetcode - Refresh the LeetCode snapshot only
pub async fn refresh_leetcode(
    refresher: web::Data<Refresher>,
    _auth: RefreshAuth,
) -> HttpResponse {
    refresh_one(&refresher, Source::LeetCode).await
}

/// Scheduler run report, also stored as the execution log details
#[derive(Debug, Serialize)]
pub struct CronReport<'a> {
    pub timestamp: String,
    #[serde(flatten)]
    pub summary: &'a RefreshSummary,
}

#[derive(Debug, Serialize)]
pub struct CronResponse<'a> {
    pub success: bool,
    pub message: &'static str,
    #[serde(flatten)]
    pub report: CronReport<'a>,
}

/// GET /api/cron/refresh-data - Scheduler-triggered refresh
pub async fn cron_refresh(
    refresher: web::Data<Refresher>,
    store: web::Data<dyn SnapshotStore>,
    _auth: CronAuth,
) -> HttpResponse {
    log::info!("Running scheduled data refresh...");

    let summary = refresher.refresh_all().await;
    let report = CronReport {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        summary: &summary,
    };

    match serde_json::to_value(&report) {
        Ok(details) => {
            log::info!("Data refresh completed: {}", details);
            log_cron_run(store.get_ref(), CRON_JOB_NAME, CronStatus::Success, details).await;

            HttpResponse::Ok()
                .insert_header(no_store())
                .json(CronResponse {
                    success: true,
                    message: "Data refresh completed",
                    report,
                })
        }
        Err(e) => {
            log::error!("Error in cron job: {}", e);
            log_cron_run(
                store.get_ref(),
                CRON_JOB_NAME,
                CronStatus::Failure,
                json!({ "error": e.to_string() }),
            )
            .await;

            HttpResponse::InternalServerError()
                .insert_header(no_store())
                .json(json!({ "error": "Cron job failed" }))
        }
    }
}

/// Configure refresh routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/refresh-all", web::get().to(refresh_all))
        .route("/api/refresh-github", web::get().to(refresh_github))
        .route("/api/refresh-leetcode", web::get().to(refresh_leetcode))
        .route("/api/cron/refresh-data", web::get().to(cron_refresh));
}
