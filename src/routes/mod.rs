pub mod activity;
pub mod contact;
pub mod content;
pub mod health;
pub mod refresh;

use actix_web::web;

/// Registers every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure)
        .configure(activity::configure)
        .configure(content::configure)
        .configure(refresh::configure)
        .configure(contact::configure);
}
