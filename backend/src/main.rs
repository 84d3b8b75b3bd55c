//! Course Manager Backend Server
//!
//! Serves the authentication and course endpoints used by the course
//! management frontend.

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;

use course_manager_server::app_state::AppState;
use course_manager_server::auth::{AuthService, SessionCookie, TokenCodec};
use course_manager_server::config::{BootstrapAdmin, Config};
use course_manager_server::course::CourseService;
use course_manager_server::error::ApiError;
use course_manager_server::models::UserRole;
use course_manager_server::store::{CourseStore, MemoryStore, PgStore, UserStore};
use course_manager_server::user::{NewUser, UserService};
use course_manager_server::{db, middleware, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(environment = %config.environment.as_str(), "Starting course manager server");

    let (users, courses, db_pool) = match &config.database_url {
        Some(url) => {
            tracing::info!(
                "Connecting to database at {}",
                config.database_url_masked().unwrap_or_default()
            );
            let pool = db::create_pool(url, config.db_max_connections).await?;
            db::run_migrations(&pool).await?;

            let store = Arc::new(PgStore::new(pool.clone()));
            let users: Arc<dyn UserStore> = store.clone();
            let courses: Arc<dyn CourseStore> = store;
            (users, courses, Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping all data in memory");
            let store = Arc::new(MemoryStore::new());
            let users: Arc<dyn UserStore> = store.clone();
            let courses: Arc<dyn CourseStore> = store;
            (users, courses, None)
        }
    };

    let auth_service = Arc::new(AuthService::new(
        users.clone(),
        TokenCodec::new(config.token_config()),
    ));
    let user_service = Arc::new(UserService::new(users));
    let course_service = Arc::new(CourseService::new(courses));

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap_admin(&user_service, admin).await?;
    }

    let app_state = AppState::new(
        auth_service,
        user_service,
        course_service,
        SessionCookie::new(config.secure_cookies()),
        db_pool,
    );

    let mut app = routes::api_router(app_state).layer(configure_cors(&config));
    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_header));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Create the configured admin account unless the username is already taken
async fn bootstrap_admin(user_service: &UserService, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    let result = user_service
        .create(NewUser {
            username: admin.username.clone(),
            password: admin.password.clone(),
            first_name: "Admin".to_string(),
            last_name: String::new(),
            role: UserRole::Admin,
        })
        .await;

    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "Bootstrap admin created");
            Ok(())
        }
        Err(ApiError::Conflict(_)) => {
            tracing::info!(username = %admin.username, "Bootstrap admin already exists");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to create bootstrap admin"),
    }
}

fn configure_cors(config: &Config) -> CorsLayer {
    let allowed_origins_str = config.cors_allowed_origins.clone().unwrap_or_default();

    if allowed_origins_str.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    // Credentials are needed for the refresh cookie
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
