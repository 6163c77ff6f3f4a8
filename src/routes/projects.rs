//! Project scaffolding endpoints
//!
//! ## Endpoints
//!
//! - `POST   /v1/projects` - Create a project (creator becomes admin)
//! - `GET    /v1/projects/{id}` - Project detail, visibility-checked
//! - `DELETE /v1/projects/{id}` - Soft delete, admin-only
//! - `GET    /v1/projects/{id}/drafts` - Drafts branched from this project, admin-only
//! - `PUT    /v1/projects/{id}/contributors/{uid}` - Grant or change a permission, admin-only
//!
//! Projects exist here as the thing drafts branch from and the thing
//! the permission matrix runs against; this is not a full project
//! management API.

use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::drafts::{DraftListResponse, DraftResponse};
use super::{empty_response, error_response, json_response, service_error, FullBody};
use crate::auth::{Actor, Permission};
use crate::model::Project;
use crate::registrar::NewProject;
use crate::server::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetContributorRequest {
    /// `read`, `write`, or `admin`
    pub permission: Permission,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub is_public: bool,
    pub creator: String,
    pub contributors: HashMap<String, Permission>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            description: project.description.clone(),
            category: project.category.clone(),
            is_public: project.is_public,
            creator: project.creator.clone(),
            contributors: project.contributors.clone(),
            date_created: project.metadata.created_at,
            date_modified: project.metadata.updated_at,
        }
    }
}

// =============================================================================
// Route Handler
// =============================================================================

/// Main handler for /v1/projects/* routes
pub async fn handle_project_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let method = req.method().clone();

    // Extract subpath after /v1/projects
    let subpath = path.strip_prefix("/v1/projects").unwrap_or("");

    match (method, subpath) {
        // POST /v1/projects - Create a project
        (Method::POST, "") | (Method::POST, "/") => handle_create_project(req, state).await,

        // GET /v1/projects/{id}/drafts - Drafts branched from this project
        (Method::GET, p) if p.matches('/').count() == 2 && p.ends_with("/drafts") => {
            let id = p
                .strip_prefix('/')
                .and_then(|s| s.strip_suffix("/drafts"))
                .unwrap_or("");
            handle_project_drafts(req, state, id).await
        }

        // GET /v1/projects/{id} - Project detail
        (Method::GET, p) if p.matches('/').count() == 1 => {
            let id = p.trim_start_matches('/');
            handle_get_project(req, state, id).await
        }

        // DELETE /v1/projects/{id} - Soft delete
        (Method::DELETE, p) if p.matches('/').count() == 1 => {
            let id = p.trim_start_matches('/');
            handle_delete_project(req, state, id).await
        }

        // PUT /v1/projects/{id}/contributors/{uid} - Grant or change a permission
        (Method::PUT, p) if p.matches('/').count() == 3 => {
            let parts: Vec<&str> = p.trim_start_matches('/').split('/').collect();
            match parts.as_slice() {
                [id, "contributors", uid] => handle_set_contributor(req, state, id, uid).await,
                _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
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
    let segments: Vec<&str> = p.split('/').collect();
    match segments.as_slice() {
        [_] => true,
        [_, "drafts"] => true,
        [_, "contributors", _] => true,
        _ => false,
    }
}

// =============================================================================
// Endpoint Handlers
// =============================================================================

/// POST /v1/projects - Create a project
async fn handle_create_project(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    let body_bytes = match req.into_body().collect().await {
        Ok(b) => b.to_bytes(),
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid body", None),
    };

    let request: CreateProjectRequest = match serde_json::from_slice(&body_bytes) {
        Ok(r) => r,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid JSON", None),
    };

    let new_project = NewProject {
        title: request.title,
        description: request.description.unwrap_or_default(),
        category: request.category.unwrap_or_else(|| "project".to_string()),
        is_public: request.is_public.unwrap_or(false),
    };

    match state.registrar.create_project(&actor, new_project) {
        Ok(project) => json_response(StatusCode::CREATED, &ProjectResponse::from(&project)),
        Err(e) => service_error(&e),
    }
}

/// GET /v1/projects/{id} - Project detail
async fn handle_get_project(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    match state.registrar.get_project(&actor, id) {
        Ok(project) => json_response(StatusCode::OK, &ProjectResponse::from(&project)),
        Err(e) => service_error(&e),
    }
}

/// DELETE /v1/projects/{id} - Soft delete
async fn handle_delete_project(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    match state.registrar.delete_project(&actor, id) {
        Ok(()) => empty_response(StatusCode::NO_CONTENT),
        Err(e) => service_error(&e),
    }
}

/// GET /v1/projects/{id}/drafts - Live, unconsumed drafts for a project
async fn handle_project_drafts(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    match state.registrar.list_project_drafts(&actor, id) {
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

/// PUT /v1/projects/{id}/contributors/{uid} - Grant or change a permission
async fn handle_set_contributor(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: &str,
    uid: &str,
) -> Response<FullBody> {
    let actor = Actor::from_headers(req.headers());

    let body_bytes = match req.into_body().collect().await {
        Ok(b) => b.to_bytes(),
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid body", None),
    };

    let request: SetContributorRequest = match serde_json::from_slice(&body_bytes) {
        Ok(r) => r,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid JSON", None),
    };

    match state
        .registrar
        .set_contributor(&actor, id, uid, request.permission)
    {
        Ok(project) => json_response(StatusCode::OK, &ProjectResponse::from(&project)),
        Err(e) => service_error(&e),
    }
}
