//! GitHub fetcher: most recently pushed repositories with their latest commit.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use super::{build_url, transport_error, FetchReport, Source, SourceFetcher};
use crate::config::GitHubConfig;
use crate::error::{FetchError, FetchResult};
use crate::models::CommitSnapshot;
use crate::services::timestamp;
use crate::store::SnapshotStore;

pub const MAX_REPOSITORIES: usize = 10;

const USER_AGENT: &str = "GitHub-Portfolio-Fetcher";
const NO_DESCRIPTION: &str = "No description";
const NO_COMMITS: &str = "No commits";
const COMMIT_UNAVAILABLE: &str = "Could not fetch latest commit";
const UNKNOWN_LANGUAGE: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct RawRepo {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    stargazers_count: i64,
    #[serde(default)]
    forks_count: i64,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    pushed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    #[serde(default)]
    commit: Option<RawCommitDetail>,
}

#[derive(Debug, Deserialize)]
struct RawCommitDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    author: Option<RawCommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct RawCommitAuthor {
    #[serde(default)]
    date: Option<String>,
}

impl RawRepo {
    fn snapshot(&self, message: &str, date: Option<&str>, now: DateTime<Utc>) -> CommitSnapshot {
        let date = date
            .and_then(timestamp::parse_str)
            .or_else(|| self.pushed_at.as_deref().and_then(timestamp::parse_str))
            .unwrap_or(now);

        CommitSnapshot {
            name: self.name.clone(),
            description: non_empty(self.description.as_deref()).unwrap_or(NO_DESCRIPTION).to_string(),
            last_commit_message: message.to_string(),
            date,
            url: self.html_url.clone(),
            stars: self.stargazers_count,
            forks: self.forks_count,
            language: non_empty(self.language.as_deref()).unwrap_or(UNKNOWN_LANGUAGE).to_string(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

/// Reads the reset time of a rate-limited response, if it is one
fn rate_limit_reset(response: &Response) -> Option<Option<DateTime<Utc>>> {
    let status = response.status();
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let reset = header_str(response, "x-ratelimit-reset");
    let exhausted = header_str(response, "x-ratelimit-remaining") == Some("0");
    if reset.is_none() && !exhausted {
        return None;
    }

    Some(
        reset
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
    )
}

pub struct GitHubFetcher {
    config: GitHubConfig,
    client: reqwest::Client,
    store: Arc<dyn SnapshotStore>,
}

impl GitHubFetcher {
    pub fn new(config: GitHubConfig, client: reqwest::Client, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            config,
            client,
            store,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.credentials().is_some()
    }

    fn credentials(&self) -> FetchResult<(&str, &str)> {
        self.config
            .credentials()
            .ok_or_else(|| FetchError::Configuration("GitHub credentials not configured".to_string()))
    }

    fn headers(token: &str) -> FetchResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("token {}", token)).map_err(|_| {
            FetchError::Configuration("GitHub token contains invalid characters".to_string())
        })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        Ok(headers)
    }

    /// Fetches and normalizes the latest activity without touching the store
    pub async fn collect(&self) -> FetchResult<Vec<CommitSnapshot>> {
        let (token, username) = self.credentials()?;
        let headers = Self::headers(token)?;

        log::info!("GitHub: fetching repositories for {}", username);
        let repos = self.list_repositories(username, &headers).await?;

        if repos.is_empty() {
            log::info!("GitHub: no repositories found");
            return Ok(Vec::new());
        }
        log::info!("GitHub: fetched {} repositories", repos.len());

        // join_all yields results in input order regardless of completion order
        let lookups = repos
            .iter()
            .map(|repo| self.latest_commit(username, repo, &headers));
        let commits: Vec<CommitSnapshot> = join_all(lookups).await.into_iter().flatten().collect();

        Ok(commits)
    }

    /// Runs a full fetch cycle: collect, then replace the commit table
    pub async fn fetch_and_store(&self) -> FetchResult<FetchReport<CommitSnapshot>> {
        let commits = self.collect().await?;

        if let Err(e) = self.store.replace_commits(&commits).await {
            log::error!("GitHub: error storing commits: {}", e);
            return Err(e.into());
        }

        log::info!("GitHub: stored {} commits", commits.len());
        Ok(FetchReport::new(commits))
    }

    async fn list_repositories(
        &self,
        username: &str,
        headers: &HeaderMap,
    ) -> FetchResult<Vec<RawRepo>> {
        let per_page = MAX_REPOSITORIES.to_string();
        let url = build_url(
            &self.config.api_url,
            &["users", username, "repos"],
            &[
                ("sort", "pushed"),
                ("direction", "desc"),
                ("per_page", per_page.as_str()),
            ],
        )?;

        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| transport_error(Source::GitHub, e))?;

        let status = response.status();
        if !status.is_success() {
            if let Some(reset_at) = rate_limit_reset(&response) {
                return Err(FetchError::RateLimited {
                    service: "GitHub",
                    reset_at,
                });
            }
            return Err(FetchError::Remote(format!(
                "GitHub API error: {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchError::Remote(format!("GitHub API returned malformed JSON: {}", e)))?;

        if !body.is_array() {
            return Err(FetchError::Remote(
                "GitHub API did not return an array of repositories".to_string(),
            ));
        }

        let mut repos: Vec<RawRepo> = serde_json::from_value(body)
            .map_err(|e| FetchError::Remote(format!("Malformed repository payload: {}", e)))?;
        repos.truncate(MAX_REPOSITORIES);

        Ok(repos)
    }

    /// Latest commit of one repository.
    ///
    /// A non-success response degrades to a placeholder message; a transport
    /// or decoding failure drops the repository from the result.
    async fn latest_commit(
        &self,
        username: &str,
        repo: &RawRepo,
        headers: &HeaderMap,
    ) -> Option<CommitSnapshot> {
        let now = Utc::now();
        log::debug!("GitHub: fetching commits for {}", repo.name);

        let url = match build_url(
            &self.config.api_url,
            &["repos", username, repo.name.as_str(), "commits"],
            &[("per_page", "1")],
        ) {
            Ok(url) => url,
            Err(e) => {
                log::error!("GitHub: error fetching commits for {}: {}", repo.name, e);
                return None;
            }
        };

        let response = match self.client.get(url).headers(headers.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("GitHub: error fetching commits for {}: {}", repo.name, e);
                return None;
            }
        };

        if !response.status().is_success() {
            log::warn!(
                "GitHub: failed to fetch commits for {} ({})",
                repo.name,
                response.status()
            );
            return Some(repo.snapshot(COMMIT_UNAVAILABLE, None, now));
        }

        let commits: Vec<RawCommit> = match response.json().await {
            Ok(commits) => commits,
            Err(e) => {
                log::error!("GitHub: malformed commits for {}: {}", repo.name, e);
                return None;
            }
        };

        let detail = commits.into_iter().next().and_then(|c| c.commit);
        let message = detail
            .as_ref()
            .and_then(|d| non_empty(d.message.as_deref()))
            .unwrap_or(NO_COMMITS);
        let date = detail
            .as_ref()
            .and_then(|d| d.author.as_ref())
            .and_then(|a| a.date.as_deref());

        Some(repo.snapshot(message, date, now))
    }
}

#[async_trait]
impl SourceFetcher for GitHubFetcher {
    fn source(&self) -> Source {
        Source::GitHub
    }

    async fn refresh(&self) -> FetchResult<usize> {
        self.fetch_and_store().await.map(|report| report.count)
    }
}
