//! Source fetchers: pull recent activity from an upstream API, normalize it
//! and replace the source's snapshot table.

pub mod github;
pub mod leetcode;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::error::{FetchError, FetchResult};

pub use github::GitHubFetcher;
pub use leetcode::LeetCodeFetcher;

/// Upstream data sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    GitHub,
    LeetCode,
}

impl Source {
    /// Display name used in logs and messages
    pub fn label(&self) -> &'static str {
        match self {
            Source::GitHub => "GitHub",
            Source::LeetCode => "LeetCode",
        }
    }

    /// Key used in JSON summaries
    pub fn key(&self) -> &'static str {
        match self {
            Source::GitHub => "github",
            Source::LeetCode => "leetcode",
        }
    }
}

/// Result of a completed fetch cycle
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> FetchReport<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// A fetcher that can run a full fetch cycle for one source
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    fn source(&self) -> Source;

    /// Runs one fetch cycle and returns the number of stored items
    async fn refresh(&self) -> FetchResult<usize>;
}

/// Builds the HTTP client shared by all fetchers
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("portfolio/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Appends path segments and query pairs to an API base URL
pub(crate) fn build_url(
    base: &str,
    segments: &[&str],
    query: &[(&str, &str)],
) -> FetchResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| FetchError::Configuration(format!("Invalid API URL '{}': {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| FetchError::Configuration(format!("API URL '{}' cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    Ok(url)
}

/// Maps a transport failure to a remote service error
pub(crate) fn transport_error(source: Source, err: reqwest::Error) -> FetchError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.to_string()
    };
    FetchError::Remote(format!("{} request failed: {}", source.label(), reason))
}
