use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::models::session::Language;
use crate::models::{CreateSessionRequest, CreateSessionResponse, ErrorResponse};
use crate::AppState;

/// Create a new collaborative session
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), (StatusCode, Json<ErrorResponse>)> {
    let Some(language) = payload.language.as_deref().and_then(Language::parse) else {
        let status = StatusCode::BAD_REQUEST;
        return Err((
            status,
            Json(ErrorResponse {
                code: status.as_u16(),
                status: status.to_string(),
                error: "Invalid or missing language".to_string(),
            }),
        ));
    };

    let session = state.store.create(language);
    info!(session_id = %session.id, %language, "session created");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
            expires_in: state.sweep_policy.hard_ttl.as_millis() as u64,
        }),
    ))
}
