//! Test fixtures: snapshot builders, a recording mailer and a wired-up
//! application state backed by the in-memory store.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use portfolio::config::{ContactConfig, GitHubConfig, LeetCodeConfig, RefreshConfig};
use portfolio::models::{CommitSnapshot, ContactMessage, Course};
use portfolio::routes;
use portfolio::services::{
    build_http_client, ContactMailer, ContentLibrary, GitHubFetcher, LeetCodeFetcher, MailError,
    RateLimiter, Refresher,
};
use portfolio::store::{MemoryStore, SnapshotStore};

use super::upstream::GITHUB_TOKEN;

pub const REFRESH_SECRET: &str = "refresh-secret";
pub const CRON_SECRET: &str = "cron-secret";

/// Nothing listens here; calls fail fast with a connection error
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub fn commit(name: &str) -> CommitSnapshot {
    CommitSnapshot {
        name: name.to_string(),
        description: format!("{} description", name),
        last_commit_message: "initial commit".to_string(),
        date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        url: format!("https://github.com/tester/{}", name),
        stars: 1,
        forks: 0,
        language: "Rust".to_string(),
    }
}

pub fn course(title: &str, completed: (i32, u32, u32)) -> Course {
    Course {
        id: Uuid::new_v4(),
        course_title: title.to_string(),
        course_description: format!("About {}", title),
        date_completed: NaiveDate::from_ymd_opt(completed.0, completed.1, completed.2).unwrap(),
        certificate_url: None,
        image_url: None,
    }
}

/// Mailer that records messages instead of sending them
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<ContactMessage>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        let mailer = Self::default();
        mailer.fail.store(true, Ordering::SeqCst);
        mailer
    }

    pub fn sent(&self) -> Vec<ContactMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContactMailer for RecordingMailer {
    async fn send(&self, message: &ContactMessage) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Application state for route tests
pub struct TestState {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub limiter: RateLimiter,
    pub github: GitHubConfig,
    pub leetcode: LeetCodeConfig,
    pub refresh: RefreshConfig,
    pub contact: ContactConfig,
    pub content_dir: PathBuf,
}

impl TestState {
    /// Both sources unconfigured, both refresh secrets set
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            mailer: Arc::new(RecordingMailer::default()),
            limiter: RateLimiter::in_memory(),
            github: GitHubConfig {
                token: None,
                username: None,
                api_url: UNREACHABLE.to_string(),
            },
            leetcode: LeetCodeConfig {
                username: None,
                session_cookie: None,
                api_url: UNREACHABLE.to_string(),
            },
            refresh: RefreshConfig {
                refresh_token: Some(REFRESH_SECRET.to_string()),
                cron_secret: Some(CRON_SECRET.to_string()),
                allow_unauthenticated: false,
                interval: None,
                http_timeout: Duration::from_secs(5),
            },
            contact: ContactConfig {
                rate_limit: 5,
                rate_window: Duration::from_secs(3600),
                sweep_interval: Duration::from_secs(300),
                smtp_host: "localhost".to_string(),
                smtp_port: 587,
                email_user: None,
                email_pass: None,
            },
            content_dir: PathBuf::from("./does-not-exist"),
        }
    }

    pub fn with_github(mut self, api_url: &str) -> Self {
        self.github = GitHubConfig {
            token: Some(GITHUB_TOKEN.to_string()),
            username: Some("tester".to_string()),
            api_url: api_url.to_string(),
        };
        self
    }

    pub fn with_leetcode(mut self, api_url: &str) -> Self {
        self.leetcode = LeetCodeConfig {
            username: Some("tester".to_string()),
            session_cookie: None,
            api_url: api_url.to_string(),
        };
        self
    }

    pub fn github_fetcher(&self) -> GitHubFetcher {
        GitHubFetcher::new(self.github.clone(), self.client(), self.store.clone())
    }

    pub fn leetcode_fetcher(&self) -> LeetCodeFetcher {
        LeetCodeFetcher::new(self.leetcode.clone(), self.client(), self.store.clone())
    }

    fn client(&self) -> reqwest::Client {
        build_http_client(self.refresh.http_timeout).unwrap()
    }

    /// Registers the state and every route, the way the server binary does
    pub fn app_config(&self) -> impl FnOnce(&mut web::ServiceConfig) {
        let store: Arc<dyn SnapshotStore> = self.store.clone();
        let mailer: Arc<dyn ContactMailer> = self.mailer.clone();
        let github = Arc::new(self.github_fetcher());
        let leetcode = Arc::new(self.leetcode_fetcher());
        let refresher = Refresher::new(github.clone(), leetcode.clone());
        let limiter = self.limiter.clone();
        let content = ContentLibrary::new(self.content_dir.clone());
        let refresh = self.refresh.clone();
        let contact = self.contact.clone();

        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(web::Data::from(store))
                .app_data(web::Data::from(mailer))
                .app_data(web::Data::from(github))
                .app_data(web::Data::from(leetcode))
                .app_data(web::Data::new(refresher))
                .app_data(web::Data::new(limiter))
                .app_data(web::Data::new(content))
                .app_data(web::Data::new(refresh))
                .app_data(web::Data::new(contact))
                .configure(routes::configure);
        }
    }
}
