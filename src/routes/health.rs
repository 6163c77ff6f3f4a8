//! Health and version endpoints
//!
//! - /health - Liveness probe with store counts
//! - /version - Build information for deployment verification
//!
//! Everything here is served from in-memory state; the gateway has no
//! external dependency whose outage could make it unhealthy, so the
//! liveness probe always answers 200 while the process runs.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::server::AppState;

/// Health response for probes and the operator's curl
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if service is running)
    pub healthy: bool,
    /// Service version
    pub version: &'static str,
    /// Operating mode
    pub mode: String,
    /// Node identifier
    pub node_id: String,
    /// Live record counts per store
    pub stores: StoreCounts,
    /// Current timestamp
    pub timestamp: String,
}

/// Live (not soft-deleted) record counts
#[derive(Serialize)]
pub struct StoreCounts {
    pub projects: usize,
    pub drafts: usize,
    pub registrations: usize,
    pub users: usize,
    pub schemas: usize,
}

/// Build health response with current state
fn build_health_response(state: &AppState) -> HealthResponse {
    let args = &state.args;

    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        mode: if args.dev_mode {
            "dev".to_string()
        } else {
            "production".to_string()
        },
        node_id: args.node_id.to_string(),
        stores: StoreCounts {
            projects: state.projects.count_active(),
            drafts: state.drafts.count_active(),
            registrations: state.registrations.count_active(),
            users: state.users.count(),
            schemas: state.schemas.len(),
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Handle liveness probe (/health)
///
/// Returns 200 OK if the gateway is running. Store counts ride along
/// for informational purposes.
pub fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = build_health_response(&state);

    let body = serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"healthy":true,"error":"Serialization failed"}"#.to_string());

    // Liveness probe: always return 200 if service is running
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
///
/// Returns build information so deployments can be verified against
/// expected commits.
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "amber",
    };

    let body = serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"version":"unknown","commit":"unknown"}"#.to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}
