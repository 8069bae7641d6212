use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::session::{Language, Participant};

/// Cursor location inside the shared buffer. Presence-only: never written
/// to session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub line: u32,
    pub column: u32,
}

/// The closed set of events a client may send over the WebSocket.
///
/// Frames that do not decode into one of these variants are answered with
/// a single `error` event and cause no state change.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "join-session", rename_all = "camelCase")]
    JoinSession { session_id: String, username: String },
    #[serde(rename = "leave-session")]
    LeaveSession,
    #[serde(rename = "code-change")]
    CodeChange { code: String },
    #[serde(rename = "language-change")]
    LanguageChange { language: Language },
    #[serde(rename = "cursor-move")]
    CursorMove { position: CursorPosition },
    #[serde(rename = "execution-started", rename_all = "camelCase")]
    ExecutionStarted {
        session_id: String,
        code: String,
        language: Language,
    },
    #[serde(rename = "execution-result", rename_all = "camelCase")]
    ExecutionResult { session_id: String, result: Value },
}

/// Events the server emits to clients. `user_id` always carries the
/// participant id, never the connection id. Execution payloads are relayed
/// opaquely with a server-stamped timestamp (Unix milliseconds).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "session-joined", rename_all = "camelCase")]
    SessionJoined {
        user_id: String,
        username: String,
        users: Vec<Participant>,
    },
    #[serde(rename = "user-joined")]
    UserJoined {
        user: Participant,
        users: Vec<Participant>,
    },
    #[serde(rename = "user-left", rename_all = "camelCase")]
    UserLeft {
        user_id: String,
        username: String,
        users: Vec<Participant>,
    },
    #[serde(rename = "code-update", rename_all = "camelCase")]
    CodeUpdate { code: String, user_id: String },
    #[serde(rename = "language-update", rename_all = "camelCase")]
    LanguageUpdate { language: Language, user_id: String },
    #[serde(rename = "cursor-update", rename_all = "camelCase")]
    CursorUpdate {
        user_id: String,
        position: CursorPosition,
    },
    #[serde(rename = "execution-started", rename_all = "camelCase")]
    ExecutionStarted {
        user_id: String,
        username: String,
        code: String,
        language: Language,
        timestamp: i64,
    },
    #[serde(rename = "execution-update", rename_all = "camelCase")]
    ExecutionUpdate {
        user_id: String,
        username: String,
        result: Value,
        timestamp: i64,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }
}
