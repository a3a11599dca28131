use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use meeting_records::auth::pending::PendingLogins;
use meeting_records::config::AppConfig;
use meeting_records::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    // Ensure data and upload directories exist
    db::ensure_parent_dir(&config.database_url)?;
    std::fs::create_dir_all(&config.upload_dir)?;

    // Initialize database
    let pool = db::init_pool(&config.database_url)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    if let Some((username, password)) = &config.bootstrap_admin {
        db::seed_bootstrap_admin(&pool, username, password)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
    }

    // Session encryption key: SESSION_KEY keeps sessions valid across restarts
    let secret_key = match config.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let pending = web::Data::new(PendingLogins::new(config.pending_ttl));
    let bind_addr = config.bind_addr.clone();
    let config = web::Data::new(config);

    log::info!("Starting server at http://{}", bind_addr);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        let upload_dir = config.upload_dir.clone();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .app_data(pending.clone())
            .configure(|cfg| routes::configure(cfg, &upload_dir))
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
