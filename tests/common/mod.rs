//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use wedding_credits::auth::TokenIssuer;
use wedding_credits::domain::PriceTable;
use wedding_credits::store::MemoryStore;
use wedding_credits::{build_router, AppState, Settings};

pub const TOKEN_SECRET: &str = "integration-test-secret";

/// Router over a fresh in-memory store
pub fn test_app(settings: Settings) -> Router {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        TokenIssuer::new(TOKEN_SECRET, Duration::minutes(30)),
        PriceTable::default(),
        settings,
    );
    build_router(state)
}

/// Router that allows super-admin signup, as most scenarios need one
pub fn default_app() -> Router {
    test_app(Settings {
        allow_published_upgrade: false,
        allow_super_admin_signup: true,
    })
}

/// Send a JSON request and decode the JSON response (`Null` for an empty body)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let body = match body {
        Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Register an admin and return its token and id
pub async fn register(app: &Router, email: &str, role: &str) -> (String, Uuid) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "password123",
            "full_name": format!("Test {}", email),
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    let token = body["access_token"].as_str().unwrap().to_string();
    let id = body["admin"]["id"].as_str().unwrap().parse().unwrap();
    (token, id)
}

/// Create a wedding with a design and features selected
pub async fn create_wedding(
    app: &Router,
    token: &str,
    slug: &str,
    design: &str,
    features: &[&str],
) -> Uuid {
    let (status, body) = send(
        app,
        "POST",
        "/api/weddings",
        Some(token),
        Some(json!({ "title": format!("Wedding {}", slug), "slug": slug })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/weddings/{}", id),
        Some(token),
        Some(json!({ "selected_design_key": design, "selected_features": features })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);

    id
}
