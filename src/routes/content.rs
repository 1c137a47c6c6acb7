use actix_web::{web, HttpResponse};
use serde_json::json;

use super::activity::cached;
use crate::services::content::{ContentLibrary, DATACAMP_PROJECTS_FILE, PROJECTS_FILE};

async fn serve(library: &ContentLibrary, name: &str) -> HttpResponse {
    match library.load(name).await {
        Ok(doc) => HttpResponse::Ok().insert_header(cached()).json(doc),
        Err(e) => {
            log::error!("Error loading {}: {}", name, e);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to fetch projects" }))
        }
    }
}

/// GET /api/recent-projects
pub async fn recent_projects(library: web::Data<ContentLibrary>) -> HttpResponse {
    serve(&library, PROJECTS_FILE).await
}

/// GET /api/datacamp-projects
pub async fn datacamp_projects(library: web::Data<ContentLibrary>) -> HttpResponse {
    serve(&library, DATACAMP_PROJECTS_FILE).await
}

/// Configure static content routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/recent-projects", web::get().to(recent_projects))
        .route("/api/datacamp-projects", web::get().to(datacamp_projects));
}
