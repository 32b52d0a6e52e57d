#![allow(dead_code)]

use axum::body::Body;
use axum::http::StatusCode;
use chrono::Utc;
use portal::app::{AppState, AuthSettings, build_router};
use portal::auth::keys::generate_signing_key;
use portal::auth::session_token::SessionSigner;
use portal::store::memory::InMemoryStore;
use portal::store::seed::demo_data;
use std::sync::Arc;
use tower::ServiceExt;

pub type TestApp = axum::routing::RouterIntoService<Body, ()>;

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Seeded demo organization with code echoing on.
pub fn test_state() -> AppState {
    let signer = SessionSigner::new(&generate_signing_key()).expect("signer");
    AppState {
        api_version: "v1".to_string(),
        store: Arc::new(InMemoryStore::seeded(demo_data(Utc::now()))),
        signer: Arc::new(signer),
        auth: AuthSettings {
            echo_codes: true,
            ..AuthSettings::default()
        },
    }
}

pub fn app() -> TestApp {
    build_router(test_state()).into_service()
}

pub async fn login(app: &TestApp, email: &str, role: &str) -> String {
    let request = super::http_helpers::json_request(
        "POST",
        "/v1/login",
        serde_json::json!({ "email": email, "password": "password", "role": role }),
    );
    let response = app.clone().oneshot(request).await.expect("login");
    assert_eq!(response.status(), StatusCode::OK, "login as {email}");
    let body = read_json(response).await;
    body["token"].as_str().expect("token").to_string()
}

pub fn ids(items: &serde_json::Value) -> Vec<String> {
    items
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_string())
        .collect()
}
