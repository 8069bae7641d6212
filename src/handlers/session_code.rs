use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::models::{ErrorResponse, SessionCodeResponse};
use crate::AppState;

/// Get the current buffer contents and language for initial page load
pub async fn session_code(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionCodeResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.store.get(&session_id) {
        Some(session) => Ok(Json(SessionCodeResponse {
            code: session.code,
            language: session.language,
        })),
        None => {
            let status = StatusCode::NOT_FOUND;
            Err((
                status,
                Json(ErrorResponse {
                    code: status.as_u16(),
                    status: status.to_string(),
                    error: "Session not found".to_string(),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Language;
    use crate::session::store::SessionStore;
    use crate::session::sweeper::SweepPolicy;
    use crate::ws::registry::ConnectionRegistry;
    use crate::ws::rooms::RoomRegistry;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState {
            store: Arc::new(SessionStore::new()),
            rooms: RoomRegistry::new(),
            registry: ConnectionRegistry::new(),
            sweep_policy: SweepPolicy::default(),
        }
    }

    #[tokio::test]
    async fn returns_current_buffer() {
        let state = test_state();
        let session = state.store.create(Language::Go);
        assert!(state.store.update_code(&session.id, "x := 1".into()));

        let Json(body) = session_code(State(state), Path(session.id))
            .await
            .expect("found");
        assert_eq!(body.code, "x := 1");
        assert_eq!(body.language, Language::Go);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let state = test_state();
        let (status, Json(body)) = session_code(State(state), Path("nope".to_string()))
            .await
            .expect_err("missing");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Session not found");
    }
}
