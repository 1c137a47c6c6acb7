pub mod commit;
pub mod contact;
pub mod course;
pub mod cron_log;
pub mod submission;

pub use commit::CommitSnapshot;
pub use contact::{ContactMessage, ContactRequest, ContactResponse, ContactSubmission};
pub use course::Course;
pub use cron_log::{CronLogEntry, CronStatus};
pub use submission::SubmissionSnapshot;
