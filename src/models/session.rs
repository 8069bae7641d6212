use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// The closed set of languages a session can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Typescript,
    Python,
    Java,
    Go,
    Cpp,
}

pub const ALL_LANGUAGES: [Language; 6] = [
    Language::Javascript,
    Language::Typescript,
    Language::Python,
    Language::Java,
    Language::Go,
    Language::Cpp,
];

impl Language {
    /// Parse a language from its wire name. Anything outside the closed set
    /// is rejected.
    pub fn parse(value: &str) -> Option<Language> {
        match value {
            "javascript" => Some(Language::Javascript),
            "typescript" => Some(Language::Typescript),
            "python" => Some(Language::Python),
            "java" => Some(Language::Java),
            "go" => Some(Language::Go),
            "cpp" => Some(Language::Cpp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Go => "go",
            Language::Cpp => "cpp",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Javascript
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One joined identity within a session, bound to exactly one live
/// WebSocket connection. The connection id never leaves the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub username: String,
    #[serde(skip)]
    pub connection_id: Uuid,
}

/// The shared editable unit: language, code buffer and participant set.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub language: Language,
    pub code: String,
    pub participants: HashMap<String, Participant>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Metadata snapshot for a session id. Always well-formed: an unknown id
/// yields the absent shape (`exists` = false) rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub session_id: String,
    pub language: Language,
    pub user_count: usize,
    pub exists: bool,
}
