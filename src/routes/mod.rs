//! HTTP routes for Amber
//!
//! Each submodule owns one resource family and exposes a single
//! `handle_*_request` dispatcher that the server router delegates to.
//! Response helpers live here so every family speaks the same JSON
//! envelope: success bodies are plain serialized DTOs, failures are
//! `{"error": "...", "code": "..."}`.

pub mod drafts;
pub mod health;
pub mod projects;
pub mod registrations;
pub mod schemas;

pub use drafts::handle_draft_request;
pub use health::{health_check, version_info};
pub use projects::handle_project_request;
pub use registrations::handle_registration_request;
pub use schemas::handle_schema_request;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::types::AmberError;

pub(crate) type FullBody = Full<Bytes>;

/// Error envelope returned by every route on failure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

// =============================================================================
// Response Helpers
// =============================================================================

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

pub(crate) fn error_response(status: StatusCode, error: &str, code: Option<&str>) -> Response<FullBody> {
    json_response(
        status,
        &ErrorResponse {
            error: error.to_string(),
            code: code.map(|c| c.to_string()),
        },
    )
}

/// Map a service-layer error onto the wire envelope.
///
/// The status code and machine-readable code both come from the error
/// variant, so handlers never pick status codes by hand.
pub(crate) fn service_error(err: &AmberError) -> Response<FullBody> {
    error_response(err.status_code(), &err.to_string(), Some(err.code()))
}

/// Bodyless response, used for `204 No Content` on deletes
pub(crate) fn empty_response(status: StatusCode) -> Response<FullBody> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .unwrap()
}
