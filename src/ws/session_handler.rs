use std::collections::HashSet;
use tracing::info;

use crate::models::events::ServerEvent;
use crate::models::session::Participant;
use crate::utils::ids::generate_participant_id;
use crate::ws::connection::{event_message, Connection};
use crate::ws::registry::ConnectionBinding;
use crate::AppState;

/// Join a session: validate it exists, de-duplicate the display name,
/// register the participant and room membership, reply with the roster and
/// notify the rest of the room.
///
/// A connection that is already bound leaves its current session first, as
/// if it had sent an explicit leave.
pub fn handle_join(state: &AppState, conn: &mut Connection, session_id: String, username: String) {
    if state.registry.get(conn.id).is_some() {
        handle_leaving(state, conn);
    }

    if state.store.get(&session_id).is_none() {
        conn.send(&ServerEvent::error("Session not found"));
        return;
    }

    let display_name = resolve_username(&state.store.list_participants(&session_id), &username);
    let participant = Participant {
        id: generate_participant_id(),
        username: display_name.clone(),
        connection_id: conn.id,
    };

    // the session can vanish between lookup and insert if the sweeper
    // evicts it; surface that as the same client error
    if !state.store.add_participant(&session_id, participant.clone()) {
        conn.send(&ServerEvent::error("Session not found"));
        return;
    }

    state.registry.bind(
        conn.id,
        ConnectionBinding {
            session_id: session_id.clone(),
            participant_id: participant.id.clone(),
        },
    );
    state.rooms.join(&session_id, conn.id, conn.sender());
    conn.stale_writes = 0;

    let users = state.store.list_participants(&session_id);
    conn.send(&ServerEvent::SessionJoined {
        user_id: participant.id.clone(),
        username: display_name.clone(),
        users: users.clone(),
    });
    state.rooms.broadcast_except(
        &session_id,
        conn.id,
        event_message(&ServerEvent::UserJoined {
            user: participant.clone(),
            users,
        }),
    );

    info!(session_id = %session_id, user_id = %participant.id, username = %display_name, "participant joined");
}

/// Shared leaving procedure for explicit `leave-session` events and
/// transport-level disconnects. A connection that was never bound is a
/// no-op.
pub fn handle_leaving(state: &AppState, conn: &Connection) {
    let Some(binding) = state.registry.unbind(conn.id) else {
        return;
    };

    let removed = state
        .store
        .remove_participant(&binding.session_id, &binding.participant_id);
    state.rooms.leave(&binding.session_id, conn.id);

    // if the session was already evicted there is nobody left to notify
    if let Some(participant) = removed {
        let users = state.store.list_participants(&binding.session_id);
        state.rooms.broadcast(
            &binding.session_id,
            event_message(&ServerEvent::UserLeft {
                user_id: participant.id.clone(),
                username: participant.username.clone(),
                users,
            }),
        );
        info!(
            session_id = %binding.session_id,
            user_id = %participant.id,
            username = %participant.username,
            "participant left"
        );
    }
}

/// Compute a collision-free display name. Exact case-sensitive matches get
/// the first free `-2`, `-3`, … suffix.
pub fn resolve_username(existing: &[Participant], requested: &str) -> String {
    let taken: HashSet<&str> = existing.iter().map(|p| p.username.as_str()).collect();
    if !taken.contains(requested) {
        return requested.to_string();
    }
    let mut counter = 2u32;
    loop {
        let candidate = format!("{requested}-{counter}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}
