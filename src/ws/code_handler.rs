use tracing::warn;

use crate::models::events::{CursorPosition, ServerEvent};
use crate::models::session::Language;
use crate::ws::connection::{event_message, Connection};
use crate::ws::session_handler::handle_leaving;
use crate::AppState;

/// Consecutive failed store writes after which a connection is treated as
/// orphaned by session eviction and force-left.
pub const MAX_STALE_WRITES: u8 = 3;

/// Replace the shared buffer and fan the new text out to everyone except
/// the sender, who already holds the authoritative text locally.
pub fn handle_code_change(state: &AppState, conn: &mut Connection, code: String) {
    let Some(binding) = state.registry.get(conn.id) else {
        conn.send(&ServerEvent::error("Not in a session"));
        return;
    };

    if state.store.update_code(&binding.session_id, code.clone()) {
        conn.stale_writes = 0;
        state.rooms.broadcast_except(
            &binding.session_id,
            conn.id,
            event_message(&ServerEvent::CodeUpdate {
                code,
                user_id: binding.participant_id,
            }),
        );
    } else {
        conn.send(&ServerEvent::error("Failed to update code"));
        register_stale_write(state, conn);
    }
}

/// Switch the session language. Unlike free-text edits this is confirmed
/// back to the sender too: the whole room, sender included, re-renders
/// from the broadcast value.
pub fn handle_language_change(state: &AppState, conn: &mut Connection, language: Language) {
    let Some(binding) = state.registry.get(conn.id) else {
        conn.send(&ServerEvent::error("Not in a session"));
        return;
    };

    if state.store.update_language(&binding.session_id, language) {
        conn.stale_writes = 0;
        state.rooms.broadcast(
            &binding.session_id,
            event_message(&ServerEvent::LanguageUpdate {
                language,
                user_id: binding.participant_id,
            }),
        );
    } else {
        conn.send(&ServerEvent::error("Failed to update language"));
        register_stale_write(state, conn);
    }
}

/// Relay a cursor position to the rest of the room. Best-effort and
/// high-frequency: an unbound sender is silently dropped and nothing is
/// written to the store.
pub fn handle_cursor_move(state: &AppState, conn: &Connection, position: CursorPosition) {
    let Some(binding) = state.registry.get(conn.id) else {
        return;
    };

    state.rooms.broadcast_except(
        &binding.session_id,
        conn.id,
        event_message(&ServerEvent::CursorUpdate {
            user_id: binding.participant_id,
            position,
        }),
    );
}

fn register_stale_write(state: &AppState, conn: &mut Connection) {
    conn.stale_writes += 1;
    if conn.stale_writes >= MAX_STALE_WRITES {
        warn!(
            connection_id = %conn.id,
            "connection bound to a vanished session, forcing leave"
        );
        handle_leaving(state, conn);
        conn.stale_writes = 0;
    }
}
