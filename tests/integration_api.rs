//! API Integration Tests
//!
//! Drive the full router: account opening, key issuance, transfer,
//! balance, history, revocation.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware, Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use quantumbank::{api, AppState, Config};

fn test_app() -> Router {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        credential_ttl_secs: 900,
        opening_balance_minor: 10000,
    };
    let state = AppState::new(&config);

    api::create_router()
        .layer(middleware::from_fn(api::middleware::identity_middleware))
        .with_state(state)
}

fn post(uri: &str, identity: Option<Uuid>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(identity) = identity {
        builder = builder.header("X-Identity-Id", identity.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn open_account(app: &Router, identity: Uuid, username: &str, email: &str) {
    let response = app
        .clone()
        .oneshot(post(
            "/accounts",
            Some(identity),
            json!({
                "identity_id": identity,
                "username": username,
                "email": email,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "account opening failed");
}

async fn issue_key(app: &Router, identity: Uuid) -> String {
    let response = app
        .clone()
        .oneshot(post(
            "/session-key",
            Some(identity),
            json!({ "identity": identity }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "key issuance failed");

    let json = body_json(response).await;
    assert!(json["expires_at"].is_string());
    json["quantum_key"].as_str().unwrap().to_string()
}

async fn balance_of(app: &Router, identity: Uuid) -> i64 {
    let response = app
        .clone()
        .oneshot(get(&format!("/accounts/{}/balance", identity)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["balance"].as_i64().unwrap()
}

#[tokio::test]
async fn test_transfer_e2e() {
    let app = test_app();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    // 1. Open both accounts
    open_account(&app, alice, "alice", "alice@example.com").await;
    open_account(&app, bob, "bob", "bob@example.com").await;
    assert_eq!(balance_of(&app, alice).await, 10000);
    assert_eq!(balance_of(&app, bob).await, 10000);

    // 2. Issue a quantum key for Alice
    let key = issue_key(&app, alice).await;
    assert_eq!(key.len(), 64);

    // 3. Transfer 2500 minor units to Bob
    let response = app
        .clone()
        .oneshot(post(
            "/transfer",
            Some(alice),
            json!({
                "from_identity": alice,
                "to_email": "bob@example.com",
                "amount": 2500,
                "quantum_key": key,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "transfer failed");

    let json = body_json(response).await;
    assert_eq!(json["transfer_id"], 1);
    assert_eq!(json["new_balance"], 7500);
    assert_eq!(json["status"], "completed");

    // 4. Balances moved atomically
    assert_eq!(balance_of(&app, alice).await, 7500);
    assert_eq!(balance_of(&app, bob).await, 12500);

    // 5. The key is consumed: a second transfer with it is rejected
    let response = app
        .clone()
        .oneshot(post(
            "/transfer",
            Some(alice),
            json!({
                "from_identity": alice,
                "to_email": "bob@example.com",
                "amount": 100,
                "quantum_key": key,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json["error_code"], "credential_invalid");
    assert_eq!(json["details"], "already-consumed");

    // 6. And the failed attempt moved nothing
    assert_eq!(balance_of(&app, alice).await, 7500);
}

#[tokio::test]
async fn test_history_e2e() {
    let app = test_app();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    open_account(&app, alice, "alice", "alice@example.com").await;
    open_account(&app, bob, "bob", "bob@example.com").await;

    // Alice sends twice, receives once
    for (from, to_email, amount) in [
        (alice, "bob@example.com", 100),
        (bob, "alice@example.com", 250),
        (alice, "bob@example.com", 400),
    ] {
        let key = issue_key(&app, from).await;
        let response = app
            .clone()
            .oneshot(post(
                "/transfer",
                Some(from),
                json!({
                    "from_identity": from,
                    "to_email": to_email,
                    "amount": amount,
                    "quantum_key": key,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get(&format!("/accounts/{}/history", alice)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);

    // Newest first
    assert_eq!(entries[0]["transfer_id"], 3);
    assert_eq!(entries[0]["direction"], "sent");
    assert_eq!(entries[0]["counterparty"], "bob@example.com");
    assert_eq!(entries[0]["amount"], 400);

    assert_eq!(entries[1]["transfer_id"], 2);
    assert_eq!(entries[1]["direction"], "received");

    assert_eq!(entries[2]["transfer_id"], 1);
    assert_eq!(entries[2]["direction"], "sent");

    // Bob's view mirrors it
    let response = app
        .clone()
        .oneshot(get(&format!("/accounts/{}/history", bob)))
        .await
        .unwrap();
    let json = body_json(response).await;
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["direction"], "received");
    assert_eq!(entries[0]["counterparty"], "alice@example.com");
}

#[tokio::test]
async fn test_key_lifecycle_e2e() {
    let app = test_app();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    open_account(&app, alice, "alice", "alice@example.com").await;
    open_account(&app, bob, "bob", "bob@example.com").await;

    // Re-issuance supersedes: the first key stops validating
    let first = issue_key(&app, alice).await;
    let second = issue_key(&app, alice).await;
    assert_ne!(first, second);

    let response = app
        .clone()
        .oneshot(post(
            "/transfer",
            Some(alice),
            json!({
                "from_identity": alice,
                "to_email": "bob@example.com",
                "amount": 100,
                "quantum_key": first,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error_code"], "credential_invalid");
    assert_eq!(json["details"], "mismatched");

    // Logout revokes; revocation is idempotent
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post(
                "/delete-key",
                Some(alice),
                json!({ "identity": alice }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    // The revoked key no longer authorizes anything
    let response = app
        .clone()
        .oneshot(post(
            "/transfer",
            Some(alice),
            json!({
                "from_identity": alice,
                "to_email": "bob@example.com",
                "amount": 100,
                "quantum_key": second,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["details"], "already-consumed");

    assert_eq!(balance_of(&app, alice).await, 10000);
}

#[tokio::test]
async fn test_rejections_surface_verbatim() {
    let app = test_app();
    let alice = Uuid::new_v4();

    open_account(&app, alice, "alice", "alice@example.com").await;
    let key = issue_key(&app, alice).await;

    // Zero amount: rejected before the credential check
    let response = app
        .clone()
        .oneshot(post(
            "/transfer",
            Some(alice),
            json!({
                "from_identity": alice,
                "to_email": "alice@example.com",
                "amount": 0,
                "quantum_key": key,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_code"], "invalid_amount");

    // Unknown recipient
    let response = app
        .clone()
        .oneshot(post(
            "/transfer",
            Some(alice),
            json!({
                "from_identity": alice,
                "to_email": "ghost@example.com",
                "amount": 100,
                "quantum_key": key,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error_code"], "unknown_recipient");

    // Self transfer
    let response = app
        .clone()
        .oneshot(post(
            "/transfer",
            Some(alice),
            json!({
                "from_identity": alice,
                "to_email": "alice@example.com",
                "amount": 100,
                "quantum_key": key,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_code"], "self_transfer");

    // Insufficient funds: the key survived every rejection above, and is
    // consumed by the attempt that reaches the authorization boundary
    let bob = Uuid::new_v4();
    open_account(&app, bob, "bob", "bob@example.com").await;

    let response = app
        .clone()
        .oneshot(post(
            "/transfer",
            Some(alice),
            json!({
                "from_identity": alice,
                "to_email": "bob@example.com",
                "amount": 15000,
                "quantum_key": key,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error_code"], "insufficient_funds");

    // No mutation from the rejected attempt
    assert_eq!(balance_of(&app, alice).await, 10000);
    assert_eq!(balance_of(&app, bob).await, 10000);
}

#[tokio::test]
async fn test_identity_assertion_required() {
    let app = test_app();
    let alice = Uuid::new_v4();
    let mallory = Uuid::new_v4();

    open_account(&app, alice, "alice", "alice@example.com").await;
    open_account(&app, mallory, "mallory", "mallory@example.com").await;

    // No assertion header
    let response = app
        .clone()
        .oneshot(post("/session-key", None, json!({ "identity": alice })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_code"], "missing_header");

    // Assertion for a different identity
    let response = app
        .clone()
        .oneshot(post(
            "/session-key",
            Some(mallory),
            json!({ "identity": alice }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error_code"], "identity_mismatch");

    // Malformed assertion header
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/session-key")
                .header("content-type", "application/json")
                .header("X-Identity-Id", "not-a-uuid")
                .body(Body::from(json!({ "identity": alice }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error_code"],
        "invalid_identity_id"
    );
}

#[tokio::test]
async fn test_unregistered_identity_cannot_get_key() {
    let app = test_app();
    let ghost = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(post("/session-key", Some(ghost), json!({ "identity": ghost })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error_code"], "account_not_found");
}

#[tokio::test]
async fn test_duplicate_account_rejected() {
    let app = test_app();
    let alice = Uuid::new_v4();

    open_account(&app, alice, "alice", "alice@example.com").await;

    let imposter = Uuid::new_v4();
    let response = app
        .clone()
        .oneshot(post(
            "/accounts",
            Some(imposter),
            json!({
                "identity_id": imposter,
                "username": "imposter",
                "email": "alice@example.com",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error_code"], "account_exists");
}
