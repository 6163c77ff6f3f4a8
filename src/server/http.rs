//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one spawned task per accepted
//! connection. The top-level router only picks the resource family;
//! per-family dispatch (method + subpath) lives in `routes`.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::registrar::{RegistrarService, TokenService};
use crate::routes;
use crate::schema::SchemaRegistry;
use crate::store::{DraftStore, ProjectStore, RegistrationStore, UserStore};
use crate::types::AmberError;

type FullBody = Full<Bytes>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub projects: Arc<ProjectStore>,
    pub drafts: Arc<DraftStore>,
    pub registrations: Arc<RegistrationStore>,
    pub users: Arc<UserStore>,
    /// Built-in schema catalog
    pub schemas: Arc<SchemaRegistry>,
    /// Draft/registration lifecycle service
    pub registrar: Arc<RegistrarService>,
}

impl AppState {
    /// Create AppState with empty stores and the built-in schema catalog
    pub fn new(args: Args) -> Self {
        let projects = Arc::new(ProjectStore::new());
        let drafts = Arc::new(DraftStore::new());
        let registrations = Arc::new(RegistrationStore::new());
        let users = Arc::new(UserStore::new());
        let schemas = Arc::new(SchemaRegistry::with_builtin());

        let registrar = Arc::new(RegistrarService::new(
            Arc::clone(&projects),
            Arc::clone(&drafts),
            Arc::clone(&registrations),
            Arc::clone(&users),
            Arc::clone(&schemas),
            TokenService::new(&args.token_secret()),
            args.public_url(),
        ));

        Self {
            args,
            projects,
            drafts,
            registrations,
            users,
            schemas,
            registrar,
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), AmberError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Amber listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - suitable for local use only");
    }

    info!("Schema catalog loaded ({} schemas)", state.schemas.len());

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<FullBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe - returns 200 if the gateway is running
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        (_, "/health") | (_, "/healthz") | (_, "/version") => method_not_allowed_response(),

        // ====================================================================
        // Draft registration lifecycle
        // ====================================================================
        (_, p) if p == "/v1/drafts" || p.starts_with("/v1/drafts/") => {
            routes::handle_draft_request(req, Arc::clone(&state), p).await
        }

        // ====================================================================
        // Registrations (read-only snapshots)
        // ====================================================================
        (_, p) if p == "/v1/registrations" || p.starts_with("/v1/registrations/") => {
            routes::handle_registration_request(req, Arc::clone(&state), p).await
        }

        // ====================================================================
        // Project scaffolding + contributor permissions
        // ====================================================================
        (_, p) if p == "/v1/projects" || p.starts_with("/v1/projects/") => {
            routes::handle_project_request(req, Arc::clone(&state), p).await
        }

        // ====================================================================
        // Schema catalog
        // ====================================================================
        (_, p) if p == "/v1/schemas" || p.starts_with("/v1/schemas/") => {
            routes::handle_schema_request(req, Arc::clone(&state), p).await
        }

        // Not found
        _ => not_found_response(&path),
    };

    Ok(response)
}

/// Not found response
fn not_found_response(path: &str) -> Response<FullBody> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
        "hint": "API routes live under /v1"
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Method not allowed response
fn method_not_allowed_response() -> Response<FullBody> {
    let body = serde_json::json!({
        "error": "Method not allowed"
    });

    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
