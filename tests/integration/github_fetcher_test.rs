//! Integration tests for the GitHub fetcher
//!
//! Runs the fetcher against an actix-test server standing in for the GitHub API.

use chrono::{TimeZone, Utc};
use portfolio::error::FetchError;
use portfolio::services::{Source, SourceFetcher};
use portfolio::store::SnapshotStore;
use pretty_assertions::assert_eq;

use crate::common::{commit, github_server, repo_json, GitHubMock, TestState};

fn names(commits: &[portfolio::models::CommitSnapshot]) -> Vec<&str> {
    commits.iter().map(|c| c.name.as_str()).collect()
}

// =============================================================================
// Fetch Cycle Tests
// =============================================================================

#[actix_web::test]
async fn test_fetch_stores_normalized_commits() {
    let srv = github_server(GitHubMock {
        repos: vec![repo_json("folio"), repo_json("empty-repo")],
        ..Default::default()
    });
    let state = TestState::new().with_github(&srv.url(""));
    let fetcher = state.github_fetcher();

    let report = fetcher.fetch_and_store().await.unwrap();

    assert_eq!(report.count, 2);
    let first = &report.data[0];
    assert_eq!(first.name, "folio");
    assert_eq!(first.description, "folio description");
    assert_eq!(first.last_commit_message, "update folio");
    assert_eq!(first.date, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    assert_eq!(first.url, "https://github.com/tester/folio");
    assert_eq!((first.stars, first.forks), (4, 2));
    assert_eq!(first.language, "Rust");

    // No commits: placeholder message, repository push date
    let second = &report.data[1];
    assert_eq!(second.last_commit_message, "No commits");
    assert_eq!(second.date, Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap());

    let stored = state.store.list_commits(None).await.unwrap();
    assert_eq!(stored, report.data);
}

#[actix_web::test]
async fn test_order_is_kept_and_failed_lookups_are_filtered() {
    let srv = github_server(GitHubMock {
        repos: vec![
            repo_json("slow-first"),
            repo_json("broken-one"),
            repo_json("private-vault"),
            repo_json("quick"),
            repo_json("broken-two"),
            repo_json("slow-last"),
        ],
        ..Default::default()
    });
    let state = TestState::new().with_github(&srv.url(""));

    let commits = state.github_fetcher().collect().await.unwrap();

    // N = 6 listed, 2 undecodable lookups dropped, listing order preserved
    assert_eq!(
        names(&commits),
        vec!["slow-first", "private-vault", "quick", "slow-last"]
    );
    assert_eq!(commits[1].last_commit_message, "Could not fetch latest commit");
    assert_eq!(commits[2].last_commit_message, "update quick");
}

#[actix_web::test]
async fn test_listing_is_capped_at_ten_repositories() {
    let repos = (0..15).map(|i| repo_json(&format!("repo-{}", i))).collect();
    let srv = github_server(GitHubMock {
        repos,
        ..Default::default()
    });
    let state = TestState::new().with_github(&srv.url(""));

    let commits = state.github_fetcher().collect().await.unwrap();

    assert_eq!(commits.len(), 10);
    assert_eq!(commits[9].name, "repo-9");
}

#[actix_web::test]
async fn test_empty_listing_replaces_table_with_nothing() {
    let srv = github_server(GitHubMock::default());
    let state = TestState::new().with_github(&srv.url(""));
    state
        .store
        .replace_commits(&[commit("stale")])
        .await
        .unwrap();

    let count = state.github_fetcher().refresh().await.unwrap();

    assert_eq!(count, 0);
    assert!(state.store.list_commits(None).await.unwrap().is_empty());
}

// =============================================================================
// Failure Tests
// =============================================================================

#[actix_web::test]
async fn test_rate_limit_names_reset_time() {
    let srv = github_server(GitHubMock {
        repos: vec![repo_json("folio")],
        rate_limited: true,
        ..Default::default()
    });
    let state = TestState::new().with_github(&srv.url(""));

    let err = state.github_fetcher().collect().await.unwrap_err();

    assert!(matches!(err, FetchError::RateLimited { .. }));
    assert_eq!(
        err.to_string(),
        "GitHub API rate limit exceeded. Rate limit resets at: 2023-11-14 22:13:20 UTC"
    );
}

#[actix_web::test]
async fn test_listing_error_is_remote_error() {
    let srv = github_server(GitHubMock {
        listing_status: Some(404),
        ..Default::default()
    });
    let state = TestState::new().with_github(&srv.url(""));

    let err = state.github_fetcher().collect().await.unwrap_err();

    assert_eq!(err.to_string(), "GitHub API error: 404 - Not Found");
}

#[actix_web::test]
async fn test_missing_credentials_fail_before_calling_upstream() {
    let state = TestState::new();
    let fetcher = state.github_fetcher();

    assert_eq!(fetcher.source(), Source::GitHub);
    let err = fetcher.refresh().await.unwrap_err();

    assert!(matches!(err, FetchError::Configuration(_)));
    assert_eq!(err.to_string(), "GitHub credentials not configured");
}

#[actix_web::test]
async fn test_store_failure_fails_the_cycle_and_keeps_previous_rows() {
    let srv = github_server(GitHubMock {
        repos: vec![repo_json("folio")],
        ..Default::default()
    });
    let state = TestState::new().with_github(&srv.url(""));
    state
        .store
        .replace_commits(&[commit("previous")])
        .await
        .unwrap();
    state.store.set_fail_writes(true);

    let err = state.github_fetcher().refresh().await.unwrap_err();

    assert!(matches!(err, FetchError::Store(_)));
    let stored = state.store.list_commits(None).await.unwrap();
    assert_eq!(names(&stored), vec!["previous"]);
}

#[actix_web::test]
async fn test_unreachable_upstream_is_remote_error() {
    let state = TestState::new().with_github(crate::common::fixtures::UNREACHABLE);

    let err = state.github_fetcher().collect().await.unwrap_err();

    assert!(matches!(err, FetchError::Remote(_)));
    assert!(err.to_string().starts_with("GitHub request failed"));
}
