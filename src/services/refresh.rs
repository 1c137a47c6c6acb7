//! Runs the source fetchers side by side and reports each outcome on its own.

use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::fetchers::{Source, SourceFetcher};
use crate::error::FetchResult;

/// Outcome of one source within a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Succeeded { count: usize },
    Failed { error: String },
}

impl RefreshOutcome {
    pub fn from_result(source: Source, result: FetchResult<usize>) -> Self {
        match result {
            Ok(count) => RefreshOutcome::Succeeded { count },
            Err(e) => {
                log::error!("{} fetch failed: {}", source.label(), e);
                RefreshOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Stored item count, zero on failure
    pub fn count(&self) -> usize {
        match self {
            RefreshOutcome::Succeeded { count } => *count,
            RefreshOutcome::Failed { .. } => 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RefreshOutcome::Succeeded { .. } => None,
            RefreshOutcome::Failed { error } => Some(error),
        }
    }

    /// `fulfilled` or `rejected`, as reported by the scheduler endpoint
    pub fn status(&self) -> &'static str {
        match self {
            RefreshOutcome::Succeeded { .. } => "fulfilled",
            RefreshOutcome::Failed { .. } => "rejected",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Succeeded { .. })
    }
}

impl Serialize for RefreshOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RefreshOutcome", 3)?;
        state.serialize_field("status", self.status())?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("error", &self.error())?;
        state.end()
    }
}

/// Combined result of refreshing every source
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub github: RefreshOutcome,
    pub leetcode: RefreshOutcome,
}

impl RefreshSummary {
    pub fn all_succeeded(&self) -> bool {
        self.github.is_success() && self.leetcode.is_success()
    }
}

/// Refresh orchestrator over the GitHub and LeetCode fetchers
#[derive(Clone)]
pub struct Refresher {
    github: Arc<dyn SourceFetcher>,
    leetcode: Arc<dyn SourceFetcher>,
}

impl Refresher {
    pub fn new(github: Arc<dyn SourceFetcher>, leetcode: Arc<dyn SourceFetcher>) -> Self {
        Self { github, leetcode }
    }

    /// Refreshes both sources concurrently. Never fails: a failing (or
    /// panicking) fetcher is reported in its own outcome only.
    pub async fn refresh_all(&self) -> RefreshSummary {
        log::info!("Refreshing all sources...");

        let (github, leetcode) = tokio::join!(
            run_isolated(self.github.clone()),
            run_isolated(self.leetcode.clone())
        );

        let summary = RefreshSummary { github, leetcode };
        log::info!(
            "Refresh completed: github={} ({}), leetcode={} ({})",
            summary.github.status(),
            summary.github.count(),
            summary.leetcode.status(),
            summary.leetcode.count()
        );
        summary
    }

    /// Refreshes a single source
    pub async fn refresh_source(&self, source: Source) -> RefreshOutcome {
        let fetcher = match source {
            Source::GitHub => self.github.clone(),
            Source::LeetCode => self.leetcode.clone(),
        };
        run_isolated(fetcher).await
    }
}

/// Runs one fetch cycle on its own task so a panic cannot reach the caller
async fn run_isolated(fetcher: Arc<dyn SourceFetcher>) -> RefreshOutcome {
    let source = fetcher.source();
    let handle = tokio::spawn(async move { fetcher.refresh().await });

    match handle.await {
        Ok(result) => RefreshOutcome::from_result(source, result),
        Err(e) => {
            log::error!("{} refresh task aborted: {}", source.label(), e);
            RefreshOutcome::Failed {
                error: format!("{} refresh task aborted", source.label()),
            }
        }
    }
}
