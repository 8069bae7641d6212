use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::session::Language;

/// Current buffer contents and language for initial page load
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionCodeResponse {
    pub code: String,
    pub language: Language,
}
