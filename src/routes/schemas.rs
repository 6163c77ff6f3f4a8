//! Schema catalog endpoints
//!
//! ## Endpoints
//!
//! - `GET /v1/schemas` - Catalog listing; `?latest=true` collapses to
//!   the newest version of each name
//! - `GET /v1/schemas/{name}/{version}` - Resolve one schema
//!
//! Schema names contain spaces ("Open-Ended Registration"), so the
//! name path segment is percent-decoded before lookup. The catalog is
//! read-only over HTTP; schemas ship with the binary.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::{error_response, json_response, service_error, FullBody};
use crate::schema::MetaSchema;
use crate::server::AppState;
use crate::types::AmberError;

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaResponse {
    pub name: String,
    pub schema_version: u32,
    /// Full form definition (pages and questions)
    pub schema: JsonValue,
}

impl From<&MetaSchema> for SchemaResponse {
    fn from(schema: &MetaSchema) -> Self {
        Self {
            name: schema.name.clone(),
            schema_version: schema.schema_version,
            schema: schema.schema.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SchemaListResponse {
    pub count: usize,
    pub schemas: Vec<SchemaResponse>,
}

/// `?latest=true` collapses the listing to one entry per name
fn latest_only(query: Option<&str>) -> bool {
    query
        .map(|q| q.split('&').any(|pair| pair == "latest=true"))
        .unwrap_or(false)
}

// =============================================================================
// Route Handler
// =============================================================================

/// Main handler for /v1/schemas/* routes
pub async fn handle_schema_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let method = req.method().clone();

    // Extract subpath after /v1/schemas
    let subpath = path.strip_prefix("/v1/schemas").unwrap_or("");

    match (method, subpath) {
        // GET /v1/schemas - Catalog listing
        (Method::GET, "") | (Method::GET, "/") => {
            let schemas = state.schemas.list(latest_only(req.uri().query()));
            let items: Vec<SchemaResponse> =
                schemas.iter().map(|s| SchemaResponse::from(s.as_ref())).collect();
            json_response(
                StatusCode::OK,
                &SchemaListResponse {
                    count: items.len(),
                    schemas: items,
                },
            )
        }

        // GET /v1/schemas/{name}/{version} - Resolve one schema
        (Method::GET, p) if p.matches('/').count() == 2 => {
            match p.trim_start_matches('/').split_once('/') {
                Some((raw_name, raw_version)) => handle_get_schema(state, raw_name, raw_version),
                None => error_response(StatusCode::NOT_FOUND, "Not found", None),
            }
        }

        (_, p) if is_known_shape(p) => {
            error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
        }
        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

fn is_known_shape(subpath: &str) -> bool {
    let p = subpath.trim_start_matches('/');
    p.is_empty() || p.matches('/').count() == 1
}

// =============================================================================
// Endpoint Handlers
// =============================================================================

/// GET /v1/schemas/{name}/{version} - Resolve an exact (name, version) pair
fn handle_get_schema(state: Arc<AppState>, raw_name: &str, raw_version: &str) -> Response<FullBody> {
    let name = match urlencoding::decode(raw_name) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid schema name", None),
    };

    let version: u32 = match raw_version.parse() {
        Ok(v) => v,
        Err(_) => {
            return service_error(&AmberError::BadRequest(format!(
                "invalid schema version '{raw_version}'"
            )))
        }
    };

    match state.schemas.resolve(&name, version) {
        Ok(schema) => json_response(StatusCode::OK, &SchemaResponse::from(schema.as_ref())),
        Err(e) => service_error(&e),
    }
}
