use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use portfolio::config;
use portfolio::db;
use portfolio::routes;
use portfolio::scheduler;
use portfolio::services::{
    build_http_client, ContactMailer, ContentLibrary, GitHubFetcher, LeetCodeFetcher,
    RateLimiter, Refresher, SmtpMailer,
};
use portfolio::store::{PgStore, SnapshotStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("Starting portfolio server on {}:{}", config.host, config.port);

    // Create database pool
    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        log::error!("Database pool error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Run migrations
    db::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Migration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let http_client = build_http_client(config.refresh.http_timeout).map_err(|e| {
        log::error!("HTTP client error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    if config.github.credentials().is_none() {
        log::warn!("GITHUB_TOKEN or GITHUB_USERNAME not set, GitHub data will be empty");
    }
    if config.leetcode.username.is_none() {
        log::warn!("LEETCODE_USERNAME not set, LeetCode data will be empty");
    }
    if config.refresh.refresh_token.is_none() {
        if config.refresh.allow_unauthenticated {
            log::warn!("REFRESH_TOKEN not set, manual refresh is open to anyone");
        } else {
            log::warn!("REFRESH_TOKEN not set, manual refresh endpoints will deny all requests");
        }
    }

    let store: Arc<dyn SnapshotStore> = Arc::new(PgStore::new(db_pool));
    let github = Arc::new(GitHubFetcher::new(
        config.github.clone(),
        http_client.clone(),
        store.clone(),
    ));
    let leetcode = Arc::new(LeetCodeFetcher::new(
        config.leetcode.clone(),
        http_client,
        store.clone(),
    ));
    let refresher = Refresher::new(github.clone(), leetcode.clone());
    let limiter = RateLimiter::in_memory();
    let mailer: Arc<dyn ContactMailer> = Arc::new(SmtpMailer::new(&config.contact));
    let content = ContentLibrary::new(config.content_dir.clone());

    // Background tasks
    let mut tasks = vec![scheduler::spawn_rate_limit_sweeper(
        limiter.clone(),
        config.contact.sweep_interval,
    )];
    if let Some(period) = config.refresh.interval {
        log::info!("Refresh timer enabled (every {}s)", period.as_secs());
        tasks.push(scheduler::spawn_refresh_timer(
            refresher.clone(),
            store.clone(),
            period,
        ));
    }

    let store_data = web::Data::from(store);
    let github_data = web::Data::from(github);
    let leetcode_data = web::Data::from(leetcode);
    let mailer_data = web::Data::from(mailer);
    let refresher_data = web::Data::new(refresher);
    let limiter_data = web::Data::new(limiter);
    let content_data = web::Data::new(content);
    let refresh_config = web::Data::new(config.refresh.clone());
    let contact_config = web::Data::new(config.contact.clone());

    // Clone values for the closure
    let host = config.host.clone();
    let port = config.port;

    let server = HttpServer::new(move || {
        // Public read API, consumed by the site's own frontend
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .app_data(store_data.clone())
            .app_data(github_data.clone())
            .app_data(leetcode_data.clone())
            .app_data(mailer_data.clone())
            .app_data(refresher_data.clone())
            .app_data(limiter_data.clone())
            .app_data(content_data.clone())
            .app_data(refresh_config.clone())
            .app_data(contact_config.clone())
            // Middleware
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(cors)
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    let result = server.await;

    for task in tasks {
        task.abort();
    }
    log::info!("Background tasks stopped");

    result
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
