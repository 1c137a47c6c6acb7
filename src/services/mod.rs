pub mod contact;
pub mod content;
pub mod fetchers;
pub mod mailer;
pub mod rate_limit;
pub mod refresh;
pub mod timestamp;

pub use content::ContentLibrary;
pub use fetchers::{build_http_client, GitHubFetcher, LeetCodeFetcher, Source, SourceFetcher};
pub use mailer::{ContactMailer, MailError, SmtpMailer};
pub use rate_limit::{MemoryRateLimitStore, RateLimitStore, RateLimiter};
pub use refresh::{RefreshOutcome, RefreshSummary, Refresher};
