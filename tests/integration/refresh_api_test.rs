//! Integration tests for the refresh endpoints
//!
//! Tests bearer authentication, per-source outcome reporting and the
//! execution log written by the scheduler endpoint.

use actix_web::{http::StatusCode, test, App};
use portfolio::models::CronStatus;
use serde_json::{json, Value};

use crate::common::fixtures::{CRON_SECRET, REFRESH_SECRET};
use crate::common::{github_server, leetcode_server, repo_json, GitHubMock, LeetCodeMock, TestState};

fn bearer(secret: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", secret))
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[actix_web::test]
async fn test_refresh_requires_bearer_token() {
    let state = TestState::new();
    let app = test::init_service(App::new().configure(state.app_config())).await;

    for uri in ["/api/refresh-all", "/api/refresh-github", "/api/refresh-leetcode"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);

        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer("wrong"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[actix_web::test]
async fn test_refresh_without_secret_fails_closed() {
    let mut state = TestState::new();
    state.refresh.refresh_token = None;
    let app = test::init_service(App::new().configure(state.app_config())).await;

    let req = test::TestRequest::get()
        .uri("/api/refresh-all")
        .insert_header(bearer("anything"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_refresh_without_secret_can_be_opened() {
    let mut state = TestState::new();
    state.refresh.refresh_token = None;
    state.refresh.allow_unauthenticated = true;
    let app = test::init_service(App::new().configure(state.app_config())).await;

    let req = test::TestRequest::get().uri("/api/refresh-all").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_cron_does_not_accept_refresh_secret() {
    let state = TestState::new();
    let app = test::init_service(App::new().configure(state.app_config())).await;

    let req = test::TestRequest::get()
        .uri("/api/cron/refresh-data")
        .insert_header(bearer(REFRESH_SECRET))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(state.store.cron_logs().is_empty());
}

#[actix_web::test]
async fn test_cron_without_secret_fails_closed() {
    let mut state = TestState::new();
    state.refresh.cron_secret = None;
    state.refresh.allow_unauthenticated = true;
    let app = test::init_service(App::new().configure(state.app_config())).await;

    let req = test::TestRequest::get()
        .uri("/api/cron/refresh-data")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Outcome Tests
// =============================================================================

#[actix_web::test]
async fn test_refresh_all_reports_partial_failure() {
    let srv = github_server(GitHubMock {
        repos: (0..5).map(|i| repo_json(&format!("repo-{}", i))).collect(),
        ..Default::default()
    });
    // LeetCode left unconfigured
    let state = TestState::new().with_github(&srv.url(""));
    let app = test::init_service(App::new().configure(state.app_config())).await;

    let req = test::TestRequest::get()
        .uri("/api/refresh-all")
        .insert_header(bearer(REFRESH_SECRET))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("cache-control").unwrap().to_str().unwrap(),
        "no-store"
    );

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Data refresh completed",
            "github": {"count": 5, "error": null},
            "leetcode": {"count": 0, "error": "LeetCode username not configured"},
        })
    );
}

#[actix_web::test]
async fn test_refresh_single_source() {
    let srv = leetcode_server(LeetCodeMock::with_submissions(vec![
        json!({"title": "Two Sum", "timestamp": 1700000000, "statusDisplay": "Accepted"}),
    ]));
    let state = TestState::new().with_leetcode(&srv.url(""));
    let app = test::init_service(App::new().configure(state.app_config())).await;

    let req = test::TestRequest::get()
        .uri("/api/refresh-leetcode")
        .insert_header(bearer(REFRESH_SECRET))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["leetcode"], json!({"count": 1, "error": null}));

    let req = test::TestRequest::get()
        .uri("/api/refresh-github")
        .insert_header(bearer(REFRESH_SECRET))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], false);
    assert_eq!(
        body["github"],
        json!({"count": 0, "error": "GitHub credentials not configured"})
    );
}

#[actix_web::test]
async fn test_cron_refresh_reports_and_logs() {
    let srv = github_server(GitHubMock {
        repos: vec![repo_json("folio")],
        ..Default::default()
    });
    let state = TestState::new().with_github(&srv.url(""));
    let app = test::init_service(App::new().configure(state.app_config())).await;

    let req = test::TestRequest::get()
        .uri("/api/cron/refresh-data")
        .insert_header(bearer(CRON_SECRET))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Data refresh completed");
    assert!(body["timestamp"].is_string());
    assert_eq!(
        body["github"],
        json!({"status": "fulfilled", "count": 1, "error": null})
    );
    assert_eq!(body["leetcode"]["status"], "rejected");
    assert_eq!(body["leetcode"]["count"], 0);

    let logs = state.store.cron_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].job_name, "refresh-data");
    assert_eq!(logs[0].status, CronStatus::Success);
    assert_eq!(logs[0].details["github"]["count"], 1);
    assert_eq!(logs[0].details["timestamp"], body["timestamp"]);
}

#[actix_web::test]
async fn test_cron_log_failure_does_not_fail_request() {
    let state = TestState::new();
    state.store.set_fail_writes(true);
    let app = test::init_service(App::new().configure(state.app_config())).await;

    let req = test::TestRequest::get()
        .uri("/api/cron/refresh-data")
        .insert_header(bearer(CRON_SECRET))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}
