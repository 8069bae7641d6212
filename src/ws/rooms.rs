use axum::extract::ws::Message;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Outbound handle for one connection. Sends are non-blocking; the
/// connection's writer task drains the channel onto the socket.
pub type OutboundSender = mpsc::UnboundedSender<Message>;

/// Explicit broadcast-room membership: session id to the set of currently
/// subscribed connections. Broadcast targets are computed from this map
/// alone. Delivery is best-effort: a member that disconnected between
/// membership lookup and send is dropped from the room, never retried.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<String, Vec<(Uuid, OutboundSender)>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<(Uuid, OutboundSender)>>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe a connection to a session's room. Re-joining is a no-op.
    pub fn join(&self, session_id: &str, connection_id: Uuid, tx: &OutboundSender) {
        let mut rooms = self.lock();
        let members = rooms.entry(session_id.to_string()).or_default();
        if !members.iter().any(|(id, _)| *id == connection_id) {
            members.push((connection_id, tx.clone()));
        }
    }

    /// Unsubscribe a connection. Empty rooms are dropped from the map.
    pub fn leave(&self, session_id: &str, connection_id: Uuid) {
        let mut rooms = self.lock();
        if let Some(members) = rooms.get_mut(session_id) {
            members.retain(|(id, _)| *id != connection_id);
            if members.is_empty() {
                rooms.remove(session_id);
            }
        }
    }

    /// Send to every room member, including the sender.
    pub fn broadcast(&self, session_id: &str, msg: Message) {
        self.send_to_room(session_id, None, msg);
    }

    /// Send to every room member except the originating connection.
    pub fn broadcast_except(&self, session_id: &str, from: Uuid, msg: Message) {
        self.send_to_room(session_id, Some(from), msg);
    }

    fn send_to_room(&self, session_id: &str, skip: Option<Uuid>, msg: Message) {
        let mut rooms = self.lock();
        let Some(members) = rooms.get_mut(session_id) else {
            return;
        };

        let mut dead: HashSet<Uuid> = HashSet::new();
        for (id, tx) in members.iter() {
            if Some(*id) == skip {
                continue;
            }
            if tx.send(msg.clone()).is_err() {
                dead.insert(*id);
            }
        }
        if !dead.is_empty() {
            members.retain(|(id, _)| !dead.contains(id));
            debug!(session_id, removed = dead.len(), "removed dead room members");
            if members.is_empty() {
                rooms.remove(session_id);
            }
        }
    }

    pub fn room_count(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn member_count(&self, session_id: &str) -> usize {
        self.lock().get(session_id).map(Vec::len).unwrap_or(0)
    }
}
