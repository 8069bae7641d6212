use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a session. The language is validated against
/// the closed set by the handler so the caller gets a 400 rather than a
/// deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub language: Option<String>,
}

/// Response for a created session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    /// Milliseconds until the session is eligible for hard eviction
    pub expires_in: u64,
}
