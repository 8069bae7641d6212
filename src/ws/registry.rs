use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// The ephemeral association of a live connection to the session and
/// participant it currently represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionBinding {
    pub session_id: String,
    pub participant_id: String,
}

/// Connection id to binding map, owned by the gateway. Bindings are
/// back-references only: the session store remains the single owner of
/// participant data, and every mutation goes through the store.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    bindings: Arc<RwLock<HashMap<Uuid, ConnectionBinding>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a connection to a session/participant pair, replacing any
    /// previous binding for the same connection.
    pub fn bind(&self, connection_id: Uuid, binding: ConnectionBinding) {
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection_id, binding);
    }

    /// Clear a connection's binding, returning it for the leave procedure.
    pub fn unbind(&self, connection_id: Uuid) -> Option<ConnectionBinding> {
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&connection_id)
    }

    pub fn get(&self, connection_id: Uuid) -> Option<ConnectionBinding> {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&connection_id)
            .cloned()
    }

    pub fn connection_count(&self) -> usize {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
