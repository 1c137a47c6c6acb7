use std::future::{ready, Ready};
use std::net::IpAddr;

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};

use crate::auth::token::{parse_bearer, secrets_match};
use crate::config::RefreshConfig;
use crate::error::AppError;

/// Checks an `Authorization` header value against a configured secret.
///
/// With no secret configured the request is denied, unless `allow_open` is
/// set, in which case it is let through.
pub fn authorize(
    header: Option<&str>,
    secret: Option<&str>,
    allow_open: bool,
) -> Result<(), AppError> {
    let Some(secret) = secret else {
        if allow_open {
            log::warn!("No refresh secret configured, accepting unauthenticated request");
            return Ok(());
        }
        return Err(AppError::Unauthorized(
            "Refresh secret is not configured".to_string(),
        ));
    };

    let header = header
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = parse_bearer(header).ok_or_else(|| {
        AppError::Unauthorized(
            "Invalid Authorization header format, expected 'Bearer <token>'".to_string(),
        )
    })?;

    if !secrets_match(token, secret) {
        return Err(AppError::Unauthorized("Invalid bearer token".to_string()));
    }

    Ok(())
}

fn refresh_config(req: &HttpRequest) -> Result<web::Data<RefreshConfig>, AppError> {
    req.app_data::<web::Data<RefreshConfig>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("Refresh configuration not available".to_string()))
}

fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
}

/// Extractor guarding the manual refresh endpoints (`REFRESH_TOKEN`)
///
/// Usage in handlers:
/// ```ignore
/// async fn refresh_all(_auth: RefreshAuth) -> HttpResponse { ... }
/// ```
pub struct RefreshAuth;

impl FromRequest for RefreshAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = refresh_config(req).and_then(|config| {
            authorize(
                authorization_header(req),
                config.refresh_token.as_deref(),
                config.allow_unauthenticated,
            )
        });

        ready(result.map(|_| RefreshAuth))
    }
}

/// Extractor guarding the scheduler endpoint (`CRON_SECRET`). Always fails
/// closed when the secret is unset.
pub struct CronAuth;

impl FromRequest for CronAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = refresh_config(req).and_then(|config| {
            authorize(
                authorization_header(req),
                config.cron_secret.as_deref(),
                false,
            )
        });

        ready(result.map(|_| CronAuth))
    }
}

/// Client identifier used for rate limiting: first `X-Forwarded-For` entry,
/// else the peer address, else `unknown`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn from_request_parts(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> Self {
        let forwarded = forwarded_for
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match (forwarded, peer) {
            (Some(ip), _) => ClientIp(ip.to_string()),
            (None, Some(peer)) => ClientIp(peer.to_string()),
            (None, None) => ClientIp("unknown".to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for ClientIp {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let forwarded_for = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok());
        let peer = req.peer_addr().map(|addr| addr.ip());

        ready(Ok(ClientIp::from_request_parts(forwarded_for, peer)))
    }
}
