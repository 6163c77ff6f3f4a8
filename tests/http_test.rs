//! HTTP surface integration tests
//!
//! Boots the real server on an ephemeral port and speaks HTTP/1.1 to
//! it over a raw socket:
//! - Wire shapes (camelCase DTOs, error envelope with code)
//! - Status mapping (201/202/204, 400/403/404/405/409)
//! - Header-based actor resolution
//! - The full project -> draft -> freeze -> confirm walk as a client
//!   would drive it

use clap::Parser;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use amber::config::Args;
use amber::server::AppState;

// =============================================================================
// Harness
// =============================================================================

/// Reserve an ephemeral port, start the gateway on it, wait for accept.
async fn start_gateway() -> SocketAddr {
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);

    let args = Args::parse_from([
        "amber",
        "--listen",
        &addr.to_string(),
        "--token-secret",
        "http-test-secret",
        "--public-url",
        &format!("http://{}", addr),
    ]);
    let state = Arc::new(AppState::new(args));
    tokio::spawn(async move {
        let _ = amber::server::run(state).await;
    });

    for _ in 0..100 {
        if TcpStream::connect(addr).await.is_ok() {
            return addr;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("gateway did not start listening on {}", addr);
}

/// One request, one connection. Returns (status, parsed JSON body).
/// The body value is Null for empty responses (204).
async fn request(
    addr: SocketAddr,
    method: &str,
    path: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let payload = body.map(|b| b.to_string());
    let mut req = format!("{} {} HTTP/1.1\r\nHost: {}\r\n", method, path, addr);
    if let Some(u) = user {
        req.push_str(&format!("x-user-id: {}\r\n", u));
    }
    if let Some(ref p) = payload {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", p.len()));
    }
    req.push_str("Connection: close\r\n\r\n");
    if let Some(ref p) = payload {
        req.push_str(p);
    }

    stream.write_all(req.as_bytes()).await.unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8_lossy(&raw);

    let status: u16 = text
        .split_whitespace()
        .nth(1)
        .expect("status line")
        .parse()
        .expect("numeric status");
    let body_text = text.split("\r\n\r\n").nth(1).unwrap_or("");
    let body_json = if body_text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body_text.trim()).expect("JSON body")
    };
    (status, body_json)
}

const SCHEMA_NAME: &str = "OSF-Standard Pre-Data Collection Registration";

fn draft_body(project_id: &str) -> Value {
    json!({
        "branchedFrom": project_id,
        "schemaName": SCHEMA_NAME,
        "schemaVersion": 1,
        "registrationMetadata": {"Have you looked at the data?": "No"}
    })
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_and_version() {
    let addr = start_gateway().await;

    let (status, body) = request(addr, "GET", "/health", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["stores"]["schemas"], 5);
    assert_eq!(body["stores"]["projects"], 0);

    let (status, body) = request(addr, "GET", "/version", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["service"], "amber");
    assert!(body["version"].is_string());

    // Wrong verb on a known service path
    let (status, _) = request(addr, "POST", "/health", None, None).await;
    assert_eq!(status, 405);
}

#[tokio::test]
async fn test_unknown_routes_are_404() {
    let addr = start_gateway().await;

    let (status, body) = request(addr, "GET", "/nope", None, None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not Found");

    let (status, _) = request(addr, "GET", "/v1/drafts/some-id/thaw", Some("alice"), None).await;
    assert_eq!(status, 404);

    // Known collection shape, unsupported verb
    let (status, _) = request(addr, "PATCH", "/v1/drafts", Some("alice"), None).await;
    assert_eq!(status, 405);
}

// =============================================================================
// Schema catalog
// =============================================================================

#[tokio::test]
async fn test_schema_catalog_over_http() {
    let addr = start_gateway().await;

    let (status, body) = request(addr, "GET", "/v1/schemas", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 5);

    let (status, body) = request(addr, "GET", "/v1/schemas?latest=true", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 5);

    // Names with spaces arrive percent-encoded
    let (status, body) = request(
        addr,
        "GET",
        "/v1/schemas/Open-Ended%20Registration/1",
        None,
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Open-Ended Registration");
    assert_eq!(body["schemaVersion"], 1);
    assert!(body["schema"]["pages"].is_array());

    let (status, body) = request(addr, "GET", "/v1/schemas/No%20Such%20Schema/1", None, None).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = request(
        addr,
        "GET",
        "/v1/schemas/Open-Ended%20Registration/one",
        None,
        None,
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "BAD_REQUEST");
}

// =============================================================================
// Full lifecycle over the wire
// =============================================================================

#[tokio::test]
async fn test_full_walk_over_http() {
    let addr = start_gateway().await;

    // Alice scaffolds a project and adds Bob read-only
    let (status, project) = request(
        addr,
        "POST",
        "/v1/projects",
        Some("alice"),
        Some(json!({"title": "Preregistration: recall under load"})),
    )
    .await;
    assert_eq!(status, 201);
    let project_id = project["id"].as_str().unwrap().to_string();
    assert_eq!(project["contributors"]["alice"], "admin");

    let (status, project) = request(
        addr,
        "PUT",
        &format!("/v1/projects/{}/contributors/bob", project_id),
        Some("alice"),
        Some(json!({"permission": "read"})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(project["contributors"]["bob"], "read");

    // Draft creation
    let (status, draft) = request(
        addr,
        "POST",
        "/v1/drafts",
        Some("alice"),
        Some(draft_body(&project_id)),
    )
    .await;
    assert_eq!(status, 201);
    let draft_id = draft["id"].as_str().unwrap().to_string();
    assert_eq!(draft["registrationSchema"]["name"], SCHEMA_NAME);
    assert!(draft.get("registeredNode").is_none());

    // Read-only Bob cannot touch the lifecycle
    let (status, body) = request(
        addr,
        "PUT",
        &format!("/v1/drafts/{}", draft_id),
        Some("bob"),
        Some(json!({
            "schemaName": SCHEMA_NAME,
            "schemaVersion": 1,
            "registrationMetadata": {"Have you looked at the data?": "Yes"}
        })),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "PERMISSION_DENIED");

    // Initiate: 202 with token, warning, confirm URL
    let (status, ticket) = request(
        addr,
        "POST",
        &format!("/v1/drafts/{}/freeze", draft_id),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, 202);
    let token = ticket["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 64);
    assert!(ticket["warningMessage"]
        .as_str()
        .unwrap()
        .contains("Preregistration: recall under load"));
    assert_eq!(
        ticket["confirmUrl"],
        format!("http://{}/v1/drafts/{}/freeze/confirm", addr, draft_id)
    );

    // Bob cannot spend Alice's token
    let (status, body) = request(
        addr,
        "POST",
        &format!("/v1/drafts/{}/freeze/confirm", draft_id),
        Some("bob"),
        Some(json!({"token": token})),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("Incorrect token."));

    // Alice confirms
    let (status, registration) = request(
        addr,
        "POST",
        &format!("/v1/drafts/{}/freeze/confirm", draft_id),
        Some("alice"),
        Some(json!({"token": token, "registrationChoice": "immediate"})),
    )
    .await;
    assert_eq!(status, 201);
    let registration_id = registration["id"].as_str().unwrap().to_string();
    assert_eq!(registration["registeredFrom"], project_id.as_str());
    assert_eq!(registration["title"], "Preregistration: recall under load");
    assert_eq!(
        registration["registeredMeta"]["Have you looked at the data?"],
        "No"
    );
    assert_eq!(registration["state"], "registered");

    // The draft is spent: confirm again conflicts, delete conflicts
    let (status, body) = request(
        addr,
        "POST",
        &format!("/v1/drafts/{}/freeze/confirm", draft_id),
        Some("alice"),
        Some(json!({"token": token})),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["code"], "INVALID_STATE");

    let (status, _) = request(
        addr,
        "DELETE",
        &format!("/v1/drafts/{}", draft_id),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, 409);

    // Consumed drafts: kept in the owner's list, gone from the
    // project-scoped one
    let (status, listing) = request(addr, "GET", "/v1/drafts", Some("alice"), None).await;
    assert_eq!(status, 200);
    assert_eq!(listing["count"], 1);
    assert_eq!(
        listing["drafts"][0]["registeredNode"],
        registration_id.as_str()
    );

    let (status, listing) = request(
        addr,
        "GET",
        &format!("/v1/projects/{}/drafts", project_id),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(listing["count"], 0);

    // Registration read surface
    let (status, fetched) = request(
        addr,
        "GET",
        &format!("/v1/registrations/{}", registration_id),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(fetched["id"], registration_id.as_str());

    let (status, listing) = request(addr, "GET", "/v1/registrations", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(listing["count"], 0); // private project, anonymous caller
}

// =============================================================================
// Validation and permission failures on the wire
// =============================================================================

#[tokio::test]
async fn test_anonymous_and_invalid_payloads() {
    let addr = start_gateway().await;

    // No x-user-id header: project creation is forbidden
    let (status, body) = request(
        addr,
        "POST",
        "/v1/projects",
        None,
        Some(json!({"title": "ghost"})),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "PERMISSION_DENIED");

    // Listing drafts also needs an identity
    let (status, _) = request(addr, "GET", "/v1/drafts", None, None).await;
    assert_eq!(status, 403);

    // Garbage JSON
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let raw = format!(
        "POST /v1/projects HTTP/1.1\r\nHost: {}\r\nx-user-id: alice\r\nContent-Type: application/json\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot json!",
        addr
    );
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let text = String::from_utf8_lossy(&buf);
    assert!(text.starts_with("HTTP/1.1 400"));
    assert!(text.contains("Invalid JSON"));
}

#[tokio::test]
async fn test_missing_schema_version_is_validation_error() {
    let addr = start_gateway().await;

    let (status, project) = request(
        addr,
        "POST",
        "/v1/projects",
        Some("alice"),
        Some(json!({"title": "versionless"})),
    )
    .await;
    assert_eq!(status, 201);
    let project_id = project["id"].as_str().unwrap();

    let (status, body) = request(
        addr,
        "POST",
        "/v1/drafts",
        Some("alice"),
        Some(json!({
            "branchedFrom": project_id,
            "schemaName": SCHEMA_NAME
        })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("schemaVersion"));
}

#[tokio::test]
async fn test_draft_update_is_a_patch() {
    let addr = start_gateway().await;

    let (status, project) = request(
        addr,
        "POST",
        "/v1/projects",
        Some("alice"),
        Some(json!({"title": "patch semantics"})),
    )
    .await;
    assert_eq!(status, 201);
    let project_id = project["id"].as_str().unwrap().to_string();

    let (status, draft) = request(
        addr,
        "POST",
        "/v1/drafts",
        Some("alice"),
        Some(draft_body(&project_id)),
    )
    .await;
    assert_eq!(status, 201);
    let draft_id = draft["id"].as_str().unwrap().to_string();

    // Metadata-only PUT: schema reference stays put, answers replaced
    // wholesale
    let (status, updated) = request(
        addr,
        "PUT",
        &format!("/v1/drafts/{}", draft_id),
        Some("alice"),
        Some(json!({"registrationMetadata": {"comments": "second pass"}})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["registrationSchema"]["name"], SCHEMA_NAME);
    assert_eq!(updated["registrationMetadata"]["comments"], "second pass");
    assert!(updated["registrationMetadata"]
        .get("Have you looked at the data?")
        .is_none());

    // Schema-only PUT: the answers survive
    let (status, updated) = request(
        addr,
        "PUT",
        &format!("/v1/drafts/{}", draft_id),
        Some("alice"),
        Some(json!({"schemaName": "Open-Ended Registration", "schemaVersion": 1})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(
        updated["registrationSchema"]["name"],
        "Open-Ended Registration"
    );
    assert_eq!(updated["registrationMetadata"]["comments"], "second pass");
}

#[tokio::test]
async fn test_embargo_over_http() {
    let addr = start_gateway().await;

    let (_, project) = request(
        addr,
        "POST",
        "/v1/projects",
        Some("alice"),
        Some(json!({"title": "embargoed study"})),
    )
    .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let (_, draft) = request(
        addr,
        "POST",
        "/v1/drafts",
        Some("alice"),
        Some(draft_body(&project_id)),
    )
    .await;
    let draft_id = draft["id"].as_str().unwrap().to_string();

    let (_, ticket) = request(
        addr,
        "POST",
        &format!("/v1/drafts/{}/freeze", draft_id),
        Some("alice"),
        None,
    )
    .await;
    let token = ticket["token"].as_str().unwrap().to_string();

    // Embargo without a date is rejected before any service call
    let (status, body) = request(
        addr,
        "POST",
        &format!("/v1/drafts/{}/freeze/confirm", draft_id),
        Some("alice"),
        Some(json!({"token": token, "registrationChoice": "embargo"})),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("embargoEndDate"));

    // Unknown choice is rejected
    let (status, _) = request(
        addr,
        "POST",
        &format!("/v1/drafts/{}/freeze/confirm", draft_id),
        Some("alice"),
        Some(json!({"token": token, "registrationChoice": "someday"})),
    )
    .await;
    assert_eq!(status, 400);

    // A proper embargo mints an embargoed registration
    let (status, registration) = request(
        addr,
        "POST",
        &format!("/v1/drafts/{}/freeze/confirm", draft_id),
        Some("alice"),
        Some(json!({
            "token": token,
            "registrationChoice": "embargo",
            "embargoEndDate": "2099-06-01"
        })),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(registration["state"], "embargoed");
    assert!(registration["embargoEndDate"].as_str().unwrap().starts_with("2099-06-01"));
}

#[tokio::test]
async fn test_project_delete_cascades_to_draft_reads() {
    let addr = start_gateway().await;

    let (_, project) = request(
        addr,
        "POST",
        "/v1/projects",
        Some("alice"),
        Some(json!({"title": "short-lived"})),
    )
    .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let (_, draft) = request(
        addr,
        "POST",
        "/v1/drafts",
        Some("alice"),
        Some(draft_body(&project_id)),
    )
    .await;
    let draft_id = draft["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        addr,
        "DELETE",
        &format!("/v1/projects/{}", project_id),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, 204);

    let (status, body) = request(
        addr,
        "GET",
        &format!("/v1/drafts/{}", draft_id),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");
}
