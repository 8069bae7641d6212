use axum::{
    extract::{Path, State},
    Json,
};

use crate::models::SessionMetadata;
use crate::AppState;

/// Get session metadata. Always succeeds: an unknown id yields the absent
/// shape with `exists` = false.
pub async fn session_metadata(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<SessionMetadata> {
    Json(state.store.metadata(&session_id))
}
