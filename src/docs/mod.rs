use crate::models::*;
use utoipa::OpenApi;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Create a new collaborative session
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = CreateSessionResponse),
        (status = 400, description = "Invalid or missing language", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_session_doc() {}

/// Get session metadata
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Metadata snapshot, absent shape for unknown ids", body = SessionMetadata)
    )
)]
#[allow(dead_code)]
pub async fn session_metadata_doc() {}

/// Get current session code
#[utoipa::path(
    get,
    path = "/api/sessions/{id}/code",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Current buffer and language", body = SessionCodeResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn session_code_doc() {}

/// Diagnostics counters
#[utoipa::path(
    get,
    path = "/api/diagnostics",
    responses(
        (status = 200, description = "Process-local counters", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        create_session_doc,
        session_metadata_doc,
        session_code_doc,
        diagnostics_doc,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            CreateSessionRequest,
            CreateSessionResponse,
            SessionMetadata,
            SessionCodeResponse,
            DiagnosticsResponse,
            ErrorResponse,
            Language,
        )
    ),
    tags(
        (name = "api", description = "Session API endpoints")
    )
)]
pub struct ApiDoc;
