use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::models::session::{Language, Participant, Session, SessionMetadata};
use crate::utils::ids::generate_session_id;

/// Authoritative in-memory map of session id to session state.
///
/// The store is the single owner of `Session` and `Participant` records;
/// the gateway layers keep only lookup keys into it. Every operation takes
/// the lock for its full duration, so a single session's record is never
/// observed partially updated. Mutators return `false` for an unknown id
/// instead of failing, leaving it to the caller to decide whether absence
/// is an error worth reporting.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new session with an empty code buffer.
    pub fn create(&self, language: Language) -> Session {
        let now = Utc::now();
        let session = Session {
            id: generate_session_id(),
            language,
            code: String::new(),
            participants: HashMap::new(),
            created_at: now,
            last_activity: now,
        };
        self.write().insert(session.id.clone(), session.clone());
        debug!(session_id = %session.id, %language, "session created");
        session
    }

    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.read().get(session_id).cloned()
    }

    /// Metadata snapshot for a session id. Unknown ids yield the absent
    /// shape rather than an error.
    pub fn metadata(&self, session_id: &str) -> SessionMetadata {
        match self.read().get(session_id) {
            Some(session) => SessionMetadata {
                session_id: session.id.clone(),
                language: session.language,
                user_count: session.participants.len(),
                exists: true,
            },
            None => SessionMetadata {
                session_id: session_id.to_string(),
                language: Language::default(),
                user_count: 0,
                exists: false,
            },
        }
    }

    /// Replace the code buffer wholesale (last writer wins).
    pub fn update_code(&self, session_id: &str, code: String) -> bool {
        match self.write().get_mut(session_id) {
            Some(session) => {
                session.code = code;
                session.last_activity = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn update_language(&self, session_id: &str, language: Language) -> bool {
        match self.write().get_mut(session_id) {
            Some(session) => {
                session.language = language;
                session.last_activity = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Insert or overwrite a participant, keyed by participant id.
    pub fn add_participant(&self, session_id: &str, participant: Participant) -> bool {
        match self.write().get_mut(session_id) {
            Some(session) => {
                session
                    .participants
                    .insert(participant.id.clone(), participant);
                session.last_activity = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Remove a participant by id, returning the removed record so callers
    /// can notify the rest of the room. Bumps last activity only when a
    /// participant was actually removed.
    pub fn remove_participant(&self, session_id: &str, participant_id: &str) -> Option<Participant> {
        match self.write().get_mut(session_id) {
            Some(session) => {
                let removed = session.participants.remove(participant_id);
                if removed.is_some() {
                    session.last_activity = Utc::now();
                }
                removed
            }
            None => None,
        }
    }

    /// All participants of a session, empty for an unknown id.
    pub fn list_participants(&self, session_id: &str) -> Vec<Participant> {
        self.read()
            .get(session_id)
            .map(|session| session.participants.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn delete(&self, session_id: &str) -> bool {
        self.write().remove(session_id).is_some()
    }

    /// Snapshot of every live session, used by the lifecycle sweeper.
    pub fn list_all(&self) -> Vec<Session> {
        self.read().values().cloned().collect()
    }

    /// Bump last activity without other side effects. No-op for unknown ids.
    pub fn touch(&self, session_id: &str) {
        if let Some(session) = self.write().get_mut(session_id) {
            session.last_activity = Utc::now();
        }
    }

    pub fn session_count(&self) -> usize {
        self.read().len()
    }

    #[cfg(test)]
    pub(crate) fn backdate_created_at(
        &self,
        session_id: &str,
        created_at: chrono::DateTime<Utc>,
    ) -> bool {
        match self.write().get_mut(session_id) {
            Some(session) => {
                session.created_at = created_at;
                true
            }
            None => false,
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
