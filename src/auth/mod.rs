pub mod extractors;
pub mod token;

pub use extractors::{authorize, ClientIp, CronAuth, RefreshAuth};
pub use token::{parse_bearer, secrets_match};
