use actix_web::{web, HttpResponse};

use crate::auth::ClientIp;
use crate::config::ContactConfig;
use crate::error::{AppError, AppResult};
use crate::models::{ContactRequest, ContactResponse, ContactSubmission};
use crate::services::contact::{looks_like_spam, validate};
use crate::services::{ContactMailer, RateLimiter};
use crate::store::SnapshotStore;

const SENT: &str = "Email sent successfully";
const INVALID_BODY: &str = "Invalid request body";

/// POST /api/contact - Validate, screen and forward a contact message
pub async fn submit(
    limiter: web::Data<RateLimiter>,
    config: web::Data<ContactConfig>,
    mailer: web::Data<dyn ContactMailer>,
    store: web::Data<dyn SnapshotStore>,
    client: ClientIp,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    // Every request counts against the limit, parseable or not
    if !limiter.allow(client.as_str(), config.rate_limit, config.rate_window) {
        log::warn!("Contact rate limit exceeded for {}", client.as_str());
        return Err(AppError::TooManyRequests);
    }

    let request: ContactRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Malformed contact body from {}: {}", client.as_str(), e);
            return Ok(HttpResponse::BadRequest().json(ContactResponse::rejected(INVALID_BODY)));
        }
    };

    let message = match validate(&request) {
        Ok(message) => message,
        Err(reason) => {
            return Ok(HttpResponse::BadRequest().json(ContactResponse::rejected(reason)));
        }
    };

    // Spam gets the same answer as a delivered message
    if looks_like_spam(&message) {
        log::warn!("Spam detected from {}", client.as_str());
        return Ok(HttpResponse::Ok().json(ContactResponse::ok(SENT)));
    }

    if let Err(e) = mailer.send(&message).await {
        log::error!("Error sending contact email: {}", e);
        return Ok(HttpResponse::InternalServerError().json(ContactResponse::rejected(
            "Failed to send email. Please try again later.",
        )));
    }

    let submission = ContactSubmission {
        message,
        ip_address: client.0,
    };
    if let Err(e) = store.record_contact(&submission).await {
        log::error!("Failed to record contact submission: {}", e);
    }

    Ok(HttpResponse::Ok().json(ContactResponse::ok(SENT)))
}

/// Configure contact routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/contact", web::post().to(submit));
}
