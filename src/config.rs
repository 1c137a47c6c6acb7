use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub github: GitHubConfig,
    pub leetcode: LeetCodeConfig,
    pub refresh: RefreshConfig,
    pub contact: ContactConfig,
    /// Directory holding the static JSON documents (projects, DataCamp projects)
    pub content_dir: PathBuf,
}

/// Database connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

/// GitHub source credentials
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub username: Option<String>,
    /// Base URL of the REST API, without trailing slash
    pub api_url: String,
}

/// LeetCode source credentials
#[derive(Debug, Clone)]
pub struct LeetCodeConfig {
    pub username: Option<String>,
    /// Value of the LEETCODE_SESSION cookie, needed for private profiles
    pub session_cookie: Option<String>,
    /// Base URL of the site, without trailing slash (`/graphql` is appended)
    pub api_url: String,
}

/// Refresh trigger and scheduling configuration
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Bearer secret for the manual refresh endpoints
    pub refresh_token: Option<String>,
    /// Bearer secret for the scheduler endpoint
    pub cron_secret: Option<String>,
    /// When true and no refresh_token is set, manual refresh is open to anyone.
    /// Meant for local development only.
    pub allow_unauthenticated: bool,
    /// Interval of the built-in refresh timer, None disables it
    pub interval: Option<Duration>,
    /// Timeout applied to every upstream HTTP call
    pub http_timeout: Duration,
}

/// Contact form configuration
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Max submissions per client within `rate_window`
    pub rate_limit: u32,
    pub rate_window: Duration,
    /// How often expired rate limit records are swept
    pub sweep_interval: Duration,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            database: DatabaseConfig::from_env()?,
            github: GitHubConfig::from_env(),
            leetcode: LeetCodeConfig::from_env(),
            refresh: RefreshConfig::from_env(),
            contact: ContactConfig::from_env(),
            content_dir: env::var("CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./content")),
        })
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5),
            min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 1),
            acquire_timeout: Duration::from_secs(parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)),
        })
    }
}

impl GitHubConfig {
    pub fn from_env() -> Self {
        Self {
            token: non_empty("GITHUB_TOKEN"),
            username: non_empty("GITHUB_USERNAME"),
            api_url: base_url("GITHUB_API_URL", "https://api.github.com"),
        }
    }

    /// Returns (token, username) when both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.token.as_deref(), self.username.as_deref()) {
            (Some(token), Some(username)) => Some((token, username)),
            _ => None,
        }
    }
}

impl LeetCodeConfig {
    pub fn from_env() -> Self {
        Self {
            username: non_empty("LEETCODE_USERNAME"),
            session_cookie: non_empty("LEETCODE_SESSION_COOKIE"),
            api_url: base_url("LEETCODE_API_URL", "https://leetcode.com"),
        }
    }
}

impl RefreshConfig {
    pub fn from_env() -> Self {
        let interval_secs: u64 = parse_or("REFRESH_INTERVAL_SECS", 0);

        Self {
            refresh_token: non_empty("REFRESH_TOKEN"),
            cron_secret: non_empty("CRON_SECRET"),
            allow_unauthenticated: env::var("REFRESH_ALLOW_UNAUTHENTICATED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            http_timeout: positive_secs("HTTP_TIMEOUT_SECS", 15),
        }
    }
}

impl ContactConfig {
    pub fn from_env() -> Self {
        Self {
            rate_limit: parse_or("CONTACT_RATE_LIMIT", 5),
            rate_window: positive_secs("CONTACT_RATE_WINDOW_SECS", 3600),
            sweep_interval: positive_secs("RATE_LIMIT_SWEEP_SECS", 300),
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: parse_or("SMTP_PORT", 587),
            email_user: non_empty("EMAIL_USER"),
            email_pass: non_empty("EMAIL_PASS"),
        }
    }
}

/// Reads and parses an env var, falling back to `default` when unset or invalid
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Reads a duration in seconds that must be non-zero; `0` falls back to `default`
fn positive_secs(key: &str, default: u64) -> Duration {
    match parse_or(key, default) {
        0 => Duration::from_secs(default),
        secs => Duration::from_secs(secs),
    }
}

/// Reads an env var, treating empty values as unset
fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn base_url(key: &str, default: &str) -> String {
    non_empty(key)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    MissingDatabaseUrl,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL environment variable is required")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
