mod config;
mod docs;
mod handlers;
mod models;
mod routes;
mod session;
mod utils;
mod ws;

use axum::http::HeaderValue;
use axum::{routing::get, Router};
use std::panic;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use docs::ApiDoc;
use routes::create_api_routes;
use session::store::SessionStore;
use session::sweeper::{SessionSweeper, SweepPolicy};
use ws::registry::ConnectionRegistry;
use ws::rooms::RoomRegistry;

/// Shared application state, constructed once at startup and passed into
/// the HTTP and WebSocket layers. The store owns all session data; the
/// room and connection registries hold only lookup keys into it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub rooms: RoomRegistry,
    pub registry: ConnectionRegistry,
    pub sweep_policy: SweepPolicy,
}

#[tokio::main]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "codeshare=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    let app_state = AppState {
        store: Arc::new(SessionStore::new()),
        rooms: RoomRegistry::new(),
        registry: ConnectionRegistry::new(),
        sweep_policy: config.sweep_policy(),
    };

    // Start the session lifecycle sweeper
    let sweeper = SessionSweeper::new(Arc::clone(&app_state.store), app_state.sweep_policy);
    sweeper.start();

    // CORS: permissive in development, configured origins otherwise
    let cors = if config.is_development() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Combine all routes
    let app_routes = Router::new()
        // Mount API routes
        .nest("/api", create_api_routes(app_state.clone()))
        // Mount the realtime gateway
        .merge(
            Router::new()
                .route("/ws", get(ws::handler::websocket_handler))
                .with_state(app_state),
        )
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("Server running on http://{}", config.server_address());
    info!("Realtime gateway at ws://{}/ws", config.server_address());
    info!(
        "Swagger UI available at http://{}/swagger",
        config.server_address()
    );

    axum::serve(listener, app_routes)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed to start");

    sweeper.stop();
    info!("Server stopped");
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
