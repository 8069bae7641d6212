use axum::extract::ws::Message;
use tracing::error;
use uuid::Uuid;

use crate::models::events::ServerEvent;
use crate::ws::rooms::OutboundSender;

/// Serialize a server event into a text frame for room delivery.
pub fn event_message(event: &ServerEvent) -> Message {
    match serde_json::to_string(event) {
        Ok(text) => Message::Text(text),
        Err(e) => {
            error!(error = %e, "failed to serialize server event");
            Message::Text(String::new())
        }
    }
}

/// Gateway-side state for one live WebSocket connection.
///
/// The session/participant binding itself lives in the connection
/// registry; this carries only the connection identity, the outbound
/// handle, and the consecutive stale-write counter used to detect
/// connections orphaned by session eviction.
pub struct Connection {
    pub id: Uuid,
    tx: OutboundSender,
    pub stale_writes: u8,
}

impl Connection {
    pub fn new(id: Uuid, tx: OutboundSender) -> Self {
        Self {
            id,
            tx,
            stale_writes: 0,
        }
    }

    pub fn sender(&self) -> &OutboundSender {
        &self.tx
    }

    /// Reply to this connection alone. A closed channel means the peer is
    /// already gone; the frame is simply dropped.
    pub fn send(&self, event: &ServerEvent) {
        let _ = self.tx.send(event_message(event));
    }
}
