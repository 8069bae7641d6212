use chrono::Utc;
use serde_json::Value;

use crate::models::events::ServerEvent;
use crate::models::session::{Language, Participant};
use crate::ws::connection::{event_message, Connection};
use crate::AppState;

/// Announce that the sender started executing code. The payload is relayed
/// to the whole room, sender included, enriched with the sender's identity
/// and a server-stamped timestamp. Nothing is written to session state.
pub fn handle_execution_started(
    state: &AppState,
    conn: &Connection,
    session_id: String,
    code: String,
    language: Language,
) {
    let Some(participant) = resolve_sender(state, conn, &session_id) else {
        return;
    };

    state.rooms.broadcast(
        &session_id,
        event_message(&ServerEvent::ExecutionStarted {
            user_id: participant.id,
            username: participant.username,
            code,
            language,
            timestamp: Utc::now().timestamp_millis(),
        }),
    );
}

/// Relay an opaque execution result to the whole room. The coordinator
/// never interprets the result payload.
pub fn handle_execution_result(
    state: &AppState,
    conn: &Connection,
    session_id: String,
    result: Value,
) {
    let Some(participant) = resolve_sender(state, conn, &session_id) else {
        return;
    };

    state.rooms.broadcast(
        &session_id,
        event_message(&ServerEvent::ExecutionUpdate {
            user_id: participant.id,
            username: participant.username,
            result,
            timestamp: Utc::now().timestamp_millis(),
        }),
    );
}

/// Execution events declare their session id; it must match the sender's
/// binding, and the bound participant must still resolve in the store.
fn resolve_sender(state: &AppState, conn: &Connection, declared_session: &str) -> Option<Participant> {
    let binding = state
        .registry
        .get(conn.id)
        .filter(|b| b.session_id == declared_session);
    let Some(binding) = binding else {
        conn.send(&ServerEvent::error("Not in session"));
        return None;
    };

    let participant = state
        .store
        .list_participants(&binding.session_id)
        .into_iter()
        .find(|p| p.id == binding.participant_id);
    if participant.is_none() {
        conn.send(&ServerEvent::error("User not found"));
    }
    participant
}
