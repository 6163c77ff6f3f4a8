//! Registration read endpoints
//!
//! ## Endpoints
//!
//! - `GET /v1/registrations` - Registrations visible to the caller
//! - `GET /v1/registrations/{id}` - Registration detail
//!
//! Registrations are immutable snapshots; there is no write surface
//! here. New registrations are minted exclusively through the draft
//! freeze confirmation flow.

use chrono::{DateTime, Utc};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

use super::drafts::SchemaRef;
use super::{error_response, json_response, service_error, FullBody};
use crate::auth::{Actor, Permission};
use crate::model::{Registration, RegistrationState};
use crate::server::AppState;

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    /// Project the snapshot was taken from
    pub registered_from: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub is_public: bool,
    pub contributors: HashMap<String, Permission>,
    pub initiator: String,
    pub registration_schema: SchemaRef,
    /// Frozen form answers
    pub registered_meta: JsonValue,
    /// `registered`, `pending_approval`, or `embargoed`
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embargo_end_date: Option<DateTime<Utc>>,
    pub registered_date: DateTime<Utc>,
}

impl From<&Registration> for RegistrationResponse {
    fn from(registration: &Registration) -> Self {
        let (state, embargo_end_date) = match &registration.state {
            RegistrationState::Registered => ("registered", None),
            RegistrationState::PendingApproval => ("pending_approval", None),
            RegistrationState::Embargoed { end_date } => ("embargoed", Some(*end_date)),
        };

        Self {
            id: registration.id.clone(),
            registered_from: registration.registered_from.clone(),
            title: registration.title.clone(),
            description: registration.description.clone(),
            category: registration.category.clone(),
            is_public: registration.is_public,
            contributors: registration.contributors.clone(),
            initiator: registration.initiator.clone(),
            registration_schema: SchemaRef {
                name: registration.schema_name.clone(),
                version: registration.schema_version,
            },
            registered_meta: registration.registered_meta.clone(),
            state: state.to_string(),
            embargo_end_date,
            registered_date: registration.registered_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrationListResponse {
    pub count: usize,
    pub registrations: Vec<RegistrationResponse>,
}

// =============================================================================
// Route Handler
// =============================================================================

/// Main handler for /v1/registrations/* routes
pub async fn handle_registration_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let method = req.method().clone();

    // Extract subpath after /v1/registrations
    let subpath = path.strip_prefix("/v1/registrations").unwrap_or("");

    match (method, subpath) {
        // GET /v1/registrations - Registrations visible to the caller
        (Method::GET, "") | (Method::GET, "/") => handle_list_registrations(req, state).await,

        // GET /v1/registrations/{id} - Registration detail
        (Method::GET, p) if p.matches('/').count() == 1 => {
            let id = p.trim_start_matches('/');
            handle_get_registration(req, state, id).await
        }

        (_, p) if is_known_shape(p) => {
            error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
        }
        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

fn is_known_shape(subpath: &str) -> bool {
    let p = subpath.trim_start_matches('/');
    p.is_empty() || !p.contains('/')
}

// =============================================================================
// Endpoint Handlers
// =============================================================================

/// GET /v1/registrations - List visible registrations
async fn handle_list_registrations(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    match state.registrar.list_registrations(&actor) {
        Ok(registrations) => {
            let items: Vec<RegistrationResponse> =
                registrations.iter().map(RegistrationResponse::from).collect();
            json_response(
                StatusCode::OK,
                &RegistrationListResponse {
                    count: items.len(),
                    registrations: items,
                },
            )
        }
        Err(e) => service_error(&e),
    }
}

/// GET /v1/registrations/{id} - Registration detail
async fn handle_get_registration(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    match state.registrar.get_registration(&actor, id) {
        Ok(registration) => {
            json_response(StatusCode::OK, &RegistrationResponse::from(&registration))
        }
        Err(e) => service_error(&e),
    }
}
