//! LeetCode fetcher: recent submissions through the public GraphQL endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, REFERER};
use serde::Serialize;
use serde_json::{json, Value};

use super::{build_url, transport_error, FetchReport, Source, SourceFetcher};
use crate::config::LeetCodeConfig;
use crate::error::{FetchError, FetchResult};
use crate::models::SubmissionSnapshot;
use crate::services::timestamp::normalize_timestamp;
use crate::store::SnapshotStore;

pub const MAX_SUBMISSIONS: usize = 10;

const RECENT_SUBMISSIONS_QUERY: &str = r#"
    query recentSubmissions($username: String!, $limit: Int!) {
        recentSubmissionList(username: $username, limit: $limit) {
            title
            timestamp
            statusDisplay
        }
    }
"#;

#[derive(Serialize)]
struct GraphQlRequest {
    query: &'static str,
    variables: Value,
}

/// Normalizes one entry of `recentSubmissionList`
fn to_snapshot(item: &Value, now: DateTime<Utc>) -> SubmissionSnapshot {
    let text = |key: &str, fallback: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    SubmissionSnapshot {
        problem_name: text("title", "Unknown Problem"),
        submission_date: normalize_timestamp(item.get("timestamp"), now),
        submission_status: text("statusDisplay", "Unknown"),
    }
}

/// Extracts the submission list from a GraphQL response body
fn parse_submissions(body: &Value, now: DateTime<Utc>) -> FetchResult<Vec<SubmissionSnapshot>> {
    match body.pointer("/data/recentSubmissionList") {
        Some(Value::Array(items)) => Ok(items
            .iter()
            .take(MAX_SUBMISSIONS)
            .map(|item| to_snapshot(item, now))
            .collect()),
        Some(Value::Null) | None => {
            if let Some(message) = body
                .pointer("/errors/0/message")
                .and_then(Value::as_str)
            {
                return Err(FetchError::Remote(format!("LeetCode API error: {}", message)));
            }
            Ok(Vec::new())
        }
        Some(_) => Err(FetchError::Remote(
            "LeetCode API did not return submissions array".to_string(),
        )),
    }
}

pub struct LeetCodeFetcher {
    config: LeetCodeConfig,
    client: reqwest::Client,
    store: Arc<dyn SnapshotStore>,
}

impl LeetCodeFetcher {
    pub fn new(
        config: LeetCodeConfig,
        client: reqwest::Client,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            config,
            client,
            store,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.username.is_some()
    }

    fn headers(&self) -> FetchResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static("https://leetcode.com"));

        // Session cookie is only needed for private profiles
        if let Some(session) = &self.config.session_cookie {
            let cookie = HeaderValue::from_str(&format!("LEETCODE_SESSION={}", session))
                .map_err(|_| {
                    FetchError::Configuration(
                        "LeetCode session cookie contains invalid characters".to_string(),
                    )
                })?;
            headers.insert(COOKIE, cookie);
        }

        Ok(headers)
    }

    /// Fetches and normalizes recent submissions without touching the store
    pub async fn collect(&self) -> FetchResult<Vec<SubmissionSnapshot>> {
        let username = self
            .config
            .username
            .as_deref()
            .ok_or_else(|| FetchError::Configuration("LeetCode username not configured".to_string()))?;

        log::info!("LeetCode: fetching submissions for {}", username);

        let url = build_url(&self.config.api_url, &["graphql"], &[])?;
        let payload = GraphQlRequest {
            query: RECENT_SUBMISSIONS_QUERY,
            variables: json!({
                "username": username,
                "limit": MAX_SUBMISSIONS,
            }),
        };

        let response = self
            .client
            .post(url)
            .headers(self.headers()?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(Source::LeetCode, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Remote(format!(
                "LeetCode API error: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Remote(format!("LeetCode API returned malformed JSON: {}", e)))?;

        let submissions = parse_submissions(&body, Utc::now())?;
        if submissions.is_empty() {
            log::info!("LeetCode: no submissions found");
        } else {
            log::info!("LeetCode: fetched {} submissions", submissions.len());
        }

        Ok(submissions)
    }

    /// Runs a full fetch cycle: collect, then replace the submission table
    pub async fn fetch_and_store(&self) -> FetchResult<FetchReport<SubmissionSnapshot>> {
        let submissions = self.collect().await?;

        if let Err(e) = self.store.replace_submissions(&submissions).await {
            log::error!("LeetCode: error storing submissions: {}", e);
            return Err(e.into());
        }

        log::info!("LeetCode: stored {} submissions", submissions.len());
        Ok(FetchReport::new(submissions))
    }
}

#[async_trait]
impl SourceFetcher for LeetCodeFetcher {
    fn source(&self) -> Source {
        Source::LeetCode
    }

    async fn refresh(&self) -> FetchResult<usize> {
        self.fetch_and_store().await.map(|report| report.count)
    }
}
