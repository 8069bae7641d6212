use axum::{extract::State, Json};
use tracing::info;

use crate::models::DiagnosticsResponse;
use crate::AppState;

/// Process-local counters for operators
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let n_sessions = state.store.session_count() as u32;
    let n_conn = state.registry.connection_count() as u32;
    let n_rooms = state.rooms.room_count() as u32;

    info!("Diagnostics: Sessions: {}, Conn: {}, Rooms: {}", n_sessions, n_conn, n_rooms);

    Json(DiagnosticsResponse {
        n_sessions,
        n_conn,
        n_rooms,
    })
}
