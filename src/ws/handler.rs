use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::events::{ClientEvent, ServerEvent};
use crate::ws::connection::Connection;
use crate::ws::{code_handler, execution_handler, session_handler};
use crate::AppState;

/// WebSocket upgrade endpoint for the realtime gateway.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one WebSocket connection: a writer task drains the outbound
/// channel onto the socket while this task reads frames and dispatches
/// them in arrival order. Disconnect runs the same leaving procedure as an
/// explicit leave event.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let mut conn = Connection::new(Uuid::new_v4(), tx);
    info!(connection_id = %conn.id, "websocket connection established");

    let mut writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => dispatch(&state, &mut conn, &text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong/binary frames carry no events
                    Some(Err(e)) => {
                        debug!(connection_id = %conn.id, error = %e, "websocket read failed");
                        break;
                    }
                }
            }
            _ = &mut writer => break,
        }
    }

    session_handler::handle_leaving(&state, &conn);
    writer.abort();
    info!(connection_id = %conn.id, "websocket connection closed");
}

/// Decode one inbound frame into the closed event set and dispatch it.
/// Undecodable frames get a single error reply and change nothing.
pub(crate) fn dispatch(state: &AppState, conn: &mut Connection, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(connection_id = %conn.id, error = %e, "undecodable client frame");
            conn.send(&ServerEvent::error("Invalid message format"));
            return;
        }
    };

    match event {
        ClientEvent::JoinSession { session_id, username } => {
            session_handler::handle_join(state, conn, session_id, username)
        }
        ClientEvent::LeaveSession => session_handler::handle_leaving(state, conn),
        ClientEvent::CodeChange { code } => code_handler::handle_code_change(state, conn, code),
        ClientEvent::LanguageChange { language } => {
            code_handler::handle_language_change(state, conn, language)
        }
        ClientEvent::CursorMove { position } => {
            code_handler::handle_cursor_move(state, conn, position)
        }
        ClientEvent::ExecutionStarted {
            session_id,
            code,
            language,
        } => execution_handler::handle_execution_started(state, conn, session_id, code, language),
        ClientEvent::ExecutionResult { session_id, result } => {
            execution_handler::handle_execution_result(state, conn, session_id, result)
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
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn test_state() -> AppState {
        AppState {
            store: Arc::new(SessionStore::new()),
            rooms: RoomRegistry::new(),
            registry: ConnectionRegistry::new(),
            sweep_policy: SweepPolicy::default(),
        }
    }

    fn connect() -> (Connection, UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Connection::new(Uuid::new_v4(), tx), rx)
    }

    fn next_event(rx: &mut UnboundedReceiver<Message>) -> Value {
        match rx.try_recv().expect("expected a frame") {
            Message::Text(text) => serde_json::from_str(&text).expect("frame is JSON"),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    fn assert_silent(rx: &mut UnboundedReceiver<Message>) {
        assert!(rx.try_recv().is_err(), "expected no frame");
    }

    fn join(state: &AppState, conn: &mut Connection, session_id: &str, username: &str) {
        dispatch(
            state,
            conn,
            &json!({"type": "join-session", "sessionId": session_id, "username": username})
                .to_string(),
        );
    }

    #[tokio::test]
    async fn join_replies_with_roster_and_notifies_room() {
        let state = test_state();
        let session = state.store.create(Language::Python);
        let (mut ada, mut ada_rx) = connect();
        let (mut second, mut second_rx) = connect();

        join(&state, &mut ada, &session.id, "Ada");
        let joined = next_event(&mut ada_rx);
        assert_eq!(joined["type"], "session-joined");
        assert_eq!(joined["username"], "Ada");
        assert_eq!(joined["users"].as_array().unwrap().len(), 1);

        // same requested name from a second connection gets the -2 suffix
        join(&state, &mut second, &session.id, "Ada");
        let joined2 = next_event(&mut second_rx);
        assert_eq!(joined2["username"], "Ada-2");
        assert_eq!(joined2["users"].as_array().unwrap().len(), 2);

        let notified = next_event(&mut ada_rx);
        assert_eq!(notified["type"], "user-joined");
        assert_eq!(notified["user"]["username"], "Ada-2");
        assert_eq!(notified["users"].as_array().unwrap().len(), 2);
        // the joiner only gets session-joined, not its own user-joined
        assert_silent(&mut second_rx);
    }

    #[tokio::test]
    async fn join_unknown_session_is_an_error_to_sender_only() {
        let state = test_state();
        let (mut conn, mut rx) = connect();

        join(&state, &mut conn, "missing", "Ada");
        let event = next_event(&mut rx);
        assert_eq!(event["type"], "error");
        assert_eq!(event["message"], "Session not found");
        assert!(state.registry.get(conn.id).is_none());
    }

    #[tokio::test]
    async fn code_change_updates_store_and_skips_sender() {
        let state = test_state();
        let session = state.store.create(Language::Python);
        let (mut a, mut a_rx) = connect();
        let (mut b, mut b_rx) = connect();
        join(&state, &mut a, &session.id, "Ada");
        join(&state, &mut b, &session.id, "Grace");
        let a_user_id = next_event(&mut a_rx)["userId"].as_str().unwrap().to_string();
        let _ = next_event(&mut a_rx); // user-joined for Grace
        let _ = next_event(&mut b_rx); // session-joined

        dispatch(&state, &mut a, r#"{"type":"code-change","code":"x=1"}"#);

        let update = next_event(&mut b_rx);
        assert_eq!(update["type"], "code-update");
        assert_eq!(update["code"], "x=1");
        assert_eq!(update["userId"], a_user_id.as_str());
        assert_silent(&mut a_rx);
        assert_eq!(state.store.get(&session.id).unwrap().code, "x=1");
    }

    #[tokio::test]
    async fn code_change_while_unbound_is_an_error() {
        let state = test_state();
        let (mut conn, mut rx) = connect();

        dispatch(&state, &mut conn, r#"{"type":"code-change","code":"x"}"#);
        assert_eq!(next_event(&mut rx)["message"], "Not in a session");
    }

    #[tokio::test]
    async fn language_change_reaches_sender_too() {
        let state = test_state();
        let session = state.store.create(Language::Python);
        let (mut a, mut a_rx) = connect();
        let (mut b, mut b_rx) = connect();
        join(&state, &mut a, &session.id, "Ada");
        join(&state, &mut b, &session.id, "Grace");
        let _ = next_event(&mut a_rx);
        let _ = next_event(&mut a_rx);
        let _ = next_event(&mut b_rx);

        dispatch(&state, &mut a, r#"{"type":"language-change","language":"go"}"#);

        for rx in [&mut a_rx, &mut b_rx] {
            let update = next_event(rx);
            assert_eq!(update["type"], "language-update");
            assert_eq!(update["language"], "go");
        }
        assert_eq!(state.store.get(&session.id).unwrap().language, Language::Go);
    }

    #[tokio::test]
    async fn cursor_move_before_join_is_silently_dropped() {
        let state = test_state();
        let (mut conn, mut rx) = connect();

        dispatch(
            &state,
            &mut conn,
            r#"{"type":"cursor-move","position":{"line":1,"column":2}}"#,
        );

        assert_silent(&mut rx);
        assert_eq!(state.store.session_count(), 0);
        assert!(state.registry.get(conn.id).is_none());
    }

    #[tokio::test]
    async fn cursor_move_fans_out_without_echo() {
        let state = test_state();
        let session = state.store.create(Language::Python);
        let (mut a, mut a_rx) = connect();
        let (mut b, mut b_rx) = connect();
        join(&state, &mut a, &session.id, "Ada");
        join(&state, &mut b, &session.id, "Grace");
        let _ = next_event(&mut a_rx);
        let _ = next_event(&mut a_rx);
        let _ = next_event(&mut b_rx);

        dispatch(
            &state,
            &mut a,
            r#"{"type":"cursor-move","position":{"line":7,"column":3}}"#,
        );

        let update = next_event(&mut b_rx);
        assert_eq!(update["type"], "cursor-update");
        assert_eq!(update["position"], json!({"line": 7, "column": 3}));
        assert_silent(&mut a_rx);
    }

    #[tokio::test]
    async fn leave_notifies_remaining_members_once() {
        let state = test_state();
        let session = state.store.create(Language::Python);
        let (mut a, mut a_rx) = connect();
        let (mut b, mut b_rx) = connect();
        join(&state, &mut a, &session.id, "Ada");
        join(&state, &mut b, &session.id, "Grace");
        let _ = next_event(&mut a_rx);
        let _ = next_event(&mut a_rx);
        let grace_id = next_event(&mut b_rx)["userId"].as_str().unwrap().to_string();

        dispatch(&state, &mut b, r#"{"type":"leave-session"}"#);

        let left = next_event(&mut a_rx);
        assert_eq!(left["type"], "user-left");
        assert_eq!(left["userId"], grace_id.as_str());
        assert_eq!(left["username"], "Grace");
        assert_eq!(left["users"].as_array().unwrap().len(), 1);
        assert_silent(&mut a_rx);

        assert!(state.registry.get(b.id).is_none());
        assert_eq!(state.store.list_participants(&session.id).len(), 1);

        // leaving again is a no-op
        dispatch(&state, &mut b, r#"{"type":"leave-session"}"#);
        assert_silent(&mut a_rx);
        assert_silent(&mut b_rx);
    }

    #[tokio::test]
    async fn rejoining_implicitly_leaves_the_previous_session() {
        let state = test_state();
        let first = state.store.create(Language::Python);
        let second = state.store.create(Language::Go);
        let (mut mover, mut mover_rx) = connect();
        let (mut witness, mut witness_rx) = connect();
        join(&state, &mut witness, &first.id, "Witness");
        join(&state, &mut mover, &first.id, "Mover");
        let _ = next_event(&mut witness_rx); // session-joined
        let _ = next_event(&mut witness_rx); // user-joined
        let _ = next_event(&mut mover_rx); // session-joined

        join(&state, &mut mover, &second.id, "Mover");

        let left = next_event(&mut witness_rx);
        assert_eq!(left["type"], "user-left");
        assert_eq!(left["username"], "Mover");
        assert_eq!(state.store.list_participants(&first.id).len(), 1);
        assert_eq!(state.store.list_participants(&second.id).len(), 1);
        assert_eq!(
            state.registry.get(mover.id).map(|b| b.session_id),
            Some(second.id.clone())
        );
        assert_eq!(next_event(&mut mover_rx)["type"], "session-joined");
    }

    #[tokio::test]
    async fn three_stale_writes_force_leave_the_connection() {
        let state = test_state();
        let session = state.store.create(Language::Python);
        let (mut conn, mut rx) = connect();
        join(&state, &mut conn, &session.id, "Ada");
        let _ = next_event(&mut rx);

        // the sweeper can evict the session while the connection stays up
        assert!(state.store.delete(&session.id));

        for _ in 0..3 {
            dispatch(&state, &mut conn, r#"{"type":"code-change","code":"x"}"#);
            assert_eq!(next_event(&mut rx)["message"], "Failed to update code");
        }
        assert!(state.registry.get(conn.id).is_none(), "connection force-left");

        dispatch(&state, &mut conn, r#"{"type":"code-change","code":"x"}"#);
        assert_eq!(next_event(&mut rx)["message"], "Not in a session");
    }

    #[tokio::test]
    async fn stale_counter_restarts_after_rejoin() {
        let state = test_state();
        let doomed = state.store.create(Language::Python);
        let (mut conn, mut rx) = connect();
        join(&state, &mut conn, &doomed.id, "Ada");
        let _ = next_event(&mut rx);
        assert!(state.store.delete(&doomed.id));

        for _ in 0..2 {
            dispatch(&state, &mut conn, r#"{"type":"code-change","code":"x"}"#);
            assert_eq!(next_event(&mut rx)["message"], "Failed to update code");
        }
        assert!(
            state.registry.get(conn.id).is_some(),
            "two failures keep the binding"
        );

        let fresh = state.store.create(Language::Python);
        join(&state, &mut conn, &fresh.id, "Ada");
        let _ = next_event(&mut rx);

        dispatch(&state, &mut conn, r#"{"type":"code-change","code":"y"}"#);
        assert_silent(&mut rx); // lone member, write succeeded, no echo
        assert_eq!(state.store.get(&fresh.id).unwrap().code, "y");
        assert_eq!(conn.stale_writes, 0);
    }

    #[tokio::test]
    async fn execution_events_are_enriched_and_include_sender() {
        let state = test_state();
        let session = state.store.create(Language::Python);
        let (mut a, mut a_rx) = connect();
        let (mut b, mut b_rx) = connect();
        join(&state, &mut a, &session.id, "Ada");
        join(&state, &mut b, &session.id, "Grace");
        let a_user_id = next_event(&mut a_rx)["userId"].as_str().unwrap().to_string();
        let _ = next_event(&mut a_rx);
        let _ = next_event(&mut b_rx);

        dispatch(
            &state,
            &mut a,
            &json!({"type": "execution-started", "sessionId": session.id, "code": "print(1)", "language": "python"}).to_string(),
        );
        for rx in [&mut a_rx, &mut b_rx] {
            let started = next_event(rx);
            assert_eq!(started["type"], "execution-started");
            assert_eq!(started["userId"], a_user_id.as_str());
            assert_eq!(started["username"], "Ada");
            assert!(started["timestamp"].as_i64().unwrap() > 0);
        }

        dispatch(
            &state,
            &mut a,
            &json!({"type": "execution-result", "sessionId": session.id, "result": {"status": "success", "output": "1"}}).to_string(),
        );
        for rx in [&mut a_rx, &mut b_rx] {
            let update = next_event(rx);
            assert_eq!(update["type"], "execution-update");
            assert_eq!(update["result"]["status"], "success");
        }
    }

    #[tokio::test]
    async fn execution_event_with_foreign_session_id_is_rejected() {
        let state = test_state();
        let session = state.store.create(Language::Python);
        let other = state.store.create(Language::Go);
        let (mut conn, mut rx) = connect();
        join(&state, &mut conn, &session.id, "Ada");
        let _ = next_event(&mut rx);

        dispatch(
            &state,
            &mut conn,
            &json!({"type": "execution-started", "sessionId": other.id, "code": "", "language": "go"}).to_string(),
        );
        assert_eq!(next_event(&mut rx)["message"], "Not in session");
    }

    #[tokio::test]
    async fn undecodable_frame_gets_one_error_and_changes_nothing() {
        let state = test_state();
        let (mut conn, mut rx) = connect();

        dispatch(&state, &mut conn, "not json at all");
        assert_eq!(next_event(&mut rx)["message"], "Invalid message format");
        assert_silent(&mut rx);

        dispatch(&state, &mut conn, r#"{"type":"language-change","language":"cobol"}"#);
        assert_eq!(next_event(&mut rx)["message"], "Invalid message format");
        assert_eq!(state.store.session_count(), 0);
    }
}
