use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    create_session, diagnostics, health_check, ready_check, session_code, session_metadata,
};
use crate::AppState;

/// Create API routes
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/diagnostics", get(diagnostics))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(session_metadata))
        .route("/sessions/:id/code", get(session_code))
        .with_state(state)
}
