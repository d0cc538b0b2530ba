//! CodePulse API Server

mod config;
mod engine;
mod error;
mod hub;
mod ratelimit;
mod routes;
mod store;
mod validate;
mod workers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use config::AppConfig;
use engine::EngineClient;
use hub::HubHandle;
use ratelimit::RateLimiter;
use std::net::SocketAddr;
use std::sync::Arc;
use store::StoreClient;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers and workers
pub struct AppState {
    pub config: AppConfig,
    pub store: StoreClient,
    pub engine: EngineClient,
    pub hub: HubHandle,
    pub limiter: RateLimiter,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "pulse_api=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CodePulse API Server");

    let config = AppConfig::default();

    std::fs::create_dir_all(&config.reports_dir).expect("Failed to create reports directory");

    let store = StoreClient::new(&config).expect("Failed to build store client");
    let engine = EngineClient::new(&config);
    let hub = hub::spawn();

    let state = Arc::new(AppState {
        store,
        engine,
        hub,
        limiter: RateLimiter::new(),
        config,
    });

    let app = Router::new()
        // Health check (rate-limit exempt)
        .route("/health", get(routes::health))

        // Projects
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route("/api/projects/:id/scans", get(routes::projects::project_scans))
        .route(
            "/api/projects/:id/categories/:category/history",
            get(routes::projects::category_history),
        )
        .route(
            "/api/projects/:id/motivational-messages",
            get(routes::projects::motivational_messages),
        )

        // Analysis
        .route("/api/scan", post(routes::scans::trigger_scan))
        .route(
            "/api/analysis",
            get(routes::analysis::history).post(routes::analysis::submit),
        )

        // Achievements
        .route("/api/users/:id/achievements", get(routes::achievements::user_achievements))

        // Reports
        .route("/api/reports/generate", post(routes::reports::generate_report))
        .route("/api/reports/:id/download", get(routes::reports::download_report))

        // Public engine metadata
        .route("/api/engine/info", get(routes::engine_info))

        // Real-time notifications
        .route("/ws", get(routes::ws::ws_handler))

        // Rate limiting
        .layer(middleware::from_fn_with_state(Arc::clone(&state), ratelimit::rate_limit))

        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )

        // Tracing
        .layer(TraceLayer::new_for_http())

        // State
        .with_state(state.clone());

    let addr = state.config.bind_addr.clone();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
