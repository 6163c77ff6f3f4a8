//! Draft registration lifecycle endpoints
//!
//! ## Endpoints
//!
//! - `GET    /v1/drafts` - List drafts initiated by the calling user
//! - `POST   /v1/drafts` - Create a draft branched from a project
//! - `GET    /v1/drafts/{id}` - Get draft detail
//! - `PUT    /v1/drafts/{id}` - Patch schema reference and/or form answers
//! - `DELETE /v1/drafts/{id}` - Soft delete a draft
//! - `POST   /v1/drafts/{id}/freeze` - Issue a confirmation token (no state change)
//! - `POST   /v1/drafts/{id}/freeze/confirm` - Spend the token, mint the registration
//!
//! ## Authentication
//!
//! The actor comes from the `X-User-Id` header. Every endpoint here
//! requires a signed-in user; permission checks against the source
//! project happen in the registrar service.

use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::{empty_response, error_response, json_response, service_error, FullBody};
use crate::auth::Actor;
use crate::model::DraftRegistration;
use crate::registrar::{DraftUpdate, FreezeChoice, FreezeTicket, NewDraft};
use crate::server::AppState;
use crate::types::AmberError;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
    /// Project the draft branches from
    pub branched_from: String,
    pub schema_name: String,
    /// Required; kept optional in the wire shape so a missing field
    /// yields a validation error instead of a deserialize failure
    pub schema_version: Option<u32>,
    pub registration_metadata: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDraftRequest {
    /// Requested schema pair; the draft's current name or version
    /// fills in a missing half
    pub schema_name: Option<String>,
    pub schema_version: Option<u32>,
    /// When present, replaces the stored document wholesale
    pub registration_metadata: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmFreezeRequest {
    /// Token minted by the freeze endpoint for this draft and user
    pub token: String,
    /// `immediate` (default), `embargo`, or `pending_approval`
    pub registration_choice: Option<String>,
    /// Required when the choice is `embargo`
    pub embargo_end_date: Option<String>,
}

/// Schema reference as `(name, version)` pair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRef {
    pub name: String,
    pub version: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub id: String,
    pub branched_from: String,
    pub initiator: String,
    pub registration_schema: SchemaRef,
    pub registration_metadata: JsonValue,
    /// Set once the draft has been spent on a registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_node: Option<String>,
    pub datetime_initiated: DateTime<Utc>,
    pub datetime_updated: DateTime<Utc>,
}

impl From<&DraftRegistration> for DraftResponse {
    fn from(draft: &DraftRegistration) -> Self {
        Self {
            id: draft.id.clone(),
            branched_from: draft.branched_from.clone(),
            initiator: draft.initiator.clone(),
            registration_schema: SchemaRef {
                name: draft.schema_name.clone(),
                version: draft.schema_version,
            },
            registration_metadata: draft.registration_metadata.clone(),
            registered_node: draft.registered_node.clone(),
            datetime_initiated: draft.metadata.created_at,
            datetime_updated: draft.metadata.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DraftListResponse {
    pub count: usize,
    pub drafts: Vec<DraftResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezeTicketResponse {
    pub draft_id: String,
    pub token: String,
    pub warning_message: String,
    pub confirm_url: String,
}

impl From<FreezeTicket> for FreezeTicketResponse {
    fn from(ticket: FreezeTicket) -> Self {
        Self {
            draft_id: ticket.draft_id,
            token: ticket.token,
            warning_message: ticket.warning,
            confirm_url: ticket.confirm_url,
        }
    }
}

/// Map the wire choice onto the service enum. Absent means immediate.
fn parse_freeze_choice(request: &ConfirmFreezeRequest) -> Result<FreezeChoice, AmberError> {
    match request.registration_choice.as_deref() {
        None | Some("immediate") => Ok(FreezeChoice::Immediate),
        Some("embargo") => {
            let end_date = request.embargo_end_date.clone().ok_or_else(|| {
                AmberError::Validation("embargoEndDate is required for an embargo".to_string())
            })?;
            Ok(FreezeChoice::Embargo { end_date })
        }
        Some("pending_approval") => Ok(FreezeChoice::PendingApproval),
        Some(other) => Err(AmberError::Validation(format!(
            "unknown registration choice '{other}'"
        ))),
    }
}

// =============================================================================
// Route Handler
// =============================================================================

/// Main handler for /v1/drafts/* routes
pub async fn handle_draft_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let method = req.method().clone();

    // Extract subpath after /v1/drafts
    let subpath = path.strip_prefix("/v1/drafts").unwrap_or("");

    match (method, subpath) {
        // GET /v1/drafts - List the caller's drafts
        (Method::GET, "") | (Method::GET, "/") => handle_list_drafts(req, state).await,

        // POST /v1/drafts - Create a draft
        (Method::POST, "") | (Method::POST, "/") => handle_create_draft(req, state).await,

        // POST /v1/drafts/{id}/freeze/confirm - Spend the token
        (Method::POST, p) if p.ends_with("/freeze/confirm") => {
            let id = p
                .strip_prefix('/')
                .and_then(|s| s.strip_suffix("/freeze/confirm"))
                .unwrap_or("");
            handle_confirm_freeze(req, state, id).await
        }

        // POST /v1/drafts/{id}/freeze - Issue a confirmation token
        (Method::POST, p) if p.ends_with("/freeze") => {
            let id = p
                .strip_prefix('/')
                .and_then(|s| s.strip_suffix("/freeze"))
                .unwrap_or("");
            handle_initiate_freeze(req, state, id).await
        }

        // GET /v1/drafts/{id} - Draft detail
        (Method::GET, p) if p.matches('/').count() == 1 => {
            let id = p.trim_start_matches('/');
            handle_get_draft(req, state, id).await
        }

        // PUT /v1/drafts/{id} - Patch schema and/or form answers
        (Method::PUT, p) if p.matches('/').count() == 1 => {
            let id = p.trim_start_matches('/');
            handle_update_draft(req, state, id).await
        }

        // DELETE /v1/drafts/{id} - Soft delete
        (Method::DELETE, p) if p.matches('/').count() == 1 => {
            let id = p.trim_start_matches('/');
            handle_delete_draft(req, state, id).await
        }

        // Known path shape with the wrong verb gets a 405, anything else 404
        (_, p) if is_known_shape(p) => {
            error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None)
        }
        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

fn is_known_shape(subpath: &str) -> bool {
    let p = subpath.trim_start_matches('/');
    p.is_empty()
        || !p.contains('/')
        || (p.matches('/').count() == 1 && p.ends_with("/freeze"))
        || (p.matches('/').count() == 2 && p.ends_with("/freeze/confirm"))
}

// =============================================================================
// Endpoint Handlers
// =============================================================================

/// GET /v1/drafts - Drafts initiated by the calling user
async fn handle_list_drafts(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    match state.registrar.list_my_drafts(&actor) {
        Ok(drafts) => {
            let items: Vec<DraftResponse> = drafts.iter().map(DraftResponse::from).collect();
            json_response(
                StatusCode::OK,
                &DraftListResponse {
                    count: items.len(),
                    drafts: items,
                },
            )
        }
        Err(e) => service_error(&e),
    }
}

/// POST /v1/drafts - Create a draft branched from a project
async fn handle_create_draft(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    let body_bytes = match req.into_body().collect().await {
        Ok(b) => b.to_bytes(),
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid body", None),
    };

    let request: CreateDraftRequest = match serde_json::from_slice(&body_bytes) {
        Ok(r) => r,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid JSON", None),
    };

    let new_draft = NewDraft {
        branched_from: request.branched_from,
        schema_name: request.schema_name,
        schema_version: request.schema_version,
        registration_metadata: request.registration_metadata,
    };

    match state.registrar.create_draft(&actor, new_draft) {
        Ok(draft) => json_response(StatusCode::CREATED, &DraftResponse::from(&draft)),
        Err(e) => service_error(&e),
    }
}

/// GET /v1/drafts/{id} - Draft detail
async fn handle_get_draft(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    match state.registrar.get_draft(&actor, id) {
        Ok(draft) => json_response(StatusCode::OK, &DraftResponse::from(&draft)),
        Err(e) => service_error(&e),
    }
}

/// PUT /v1/drafts/{id} - Patch schema reference and/or form answers
async fn handle_update_draft(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    let body_bytes = match req.into_body().collect().await {
        Ok(b) => b.to_bytes(),
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid body", None),
    };

    let request: UpdateDraftRequest = match serde_json::from_slice(&body_bytes) {
        Ok(r) => r,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid JSON", None),
    };

    let update = DraftUpdate {
        schema_name: request.schema_name,
        schema_version: request.schema_version,
        registration_metadata: request.registration_metadata,
    };

    match state.registrar.update_draft(&actor, id, update) {
        Ok(draft) => json_response(StatusCode::OK, &DraftResponse::from(&draft)),
        Err(e) => service_error(&e),
    }
}

/// DELETE /v1/drafts/{id} - Soft delete
async fn handle_delete_draft(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    match state.registrar.delete_draft(&actor, id) {
        Ok(()) => empty_response(StatusCode::NO_CONTENT),
        Err(e) => service_error(&e),
    }
}

/// POST /v1/drafts/{id}/freeze - Mint a confirmation token
async fn handle_initiate_freeze(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    match state.registrar.initiate_freeze(&actor, id) {
        Ok(ticket) => json_response(StatusCode::ACCEPTED, &FreezeTicketResponse::from(ticket)),
        Err(e) => service_error(&e),
    }
}

/// POST /v1/drafts/{id}/freeze/confirm - Spend the token, mint the registration
async fn handle_confirm_freeze(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    let body_bytes = match req.into_body().collect().await {
        Ok(b) => b.to_bytes(),
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid body", None),
    };

    let request: ConfirmFreezeRequest = match serde_json::from_slice(&body_bytes) {
        Ok(r) => r,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid JSON", None),
    };

    let choice = match parse_freeze_choice(&request) {
        Ok(c) => c,
        Err(e) => return service_error(&e),
    };

    match state
        .registrar
        .confirm_freeze(&actor, id, &request.token, choice)
    {
        Ok(registration) => json_response(
            StatusCode::CREATED,
            &super::registrations::RegistrationResponse::from(&registration),
        ),
        Err(e) => service_error(&e),
    }
}
