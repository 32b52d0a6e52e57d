mod common;
mod http_helpers;

use axum::http::StatusCode;
use common::{TestApp, app, login, read_json};
use http_helpers::{authed_request, json_request};
use serde_json::json;
use tower::ServiceExt;

async fn post(
    app: &TestApp,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(json_request("POST", uri, body))
        .await
        .expect("response");
    let status = response.status();
    let body = if status == StatusCode::NO_CONTENT {
        serde_json::Value::Null
    } else {
        read_json(response).await
    };
    (status, body)
}

#[tokio::test]
async fn login_returns_session_and_identity() {
    let app = app();
    let (status, body) = post(
        &app,
        "/v1/login",
        json!({ "email": " HOD@renu.org ", "password": "password", "role": "department_head" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], "3");
    assert_eq!(body["user"]["department"], "Engineering");
    let token = body["token"].as_str().expect("token");

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/v1/me", token))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["email"], "hod@renu.org");
}

#[tokio::test]
async fn login_with_wrong_role_or_password_fails() {
    let app = app();
    let (status, body) = post(
        &app,
        "/v1/login",
        json!({ "email": "intern@renu.org", "password": "password", "role": "system_admin" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credentials");

    let (status, body) = post(
        &app,
        "/v1/login",
        json!({ "email": "intern@renu.org", "password": "wrong-password", "role": "participant" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credentials");

    let (status, _) = post(
        &app,
        "/v1/login",
        json!({ "email": "nobody@renu.org", "password": "password", "role": "participant" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_requires_the_issued_code() {
    let app = app();
    let (status, issued) = post(
        &app,
        "/v1/register",
        json!({
            "email": "new.intern@renu.org",
            "name": "New Intern",
            "password": "secret1",
            "role": "participant",
            "department": "Design"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let challenge_id = issued["challenge_id"].as_str().expect("challenge").to_string();
    let code = issued["code"].as_str().expect("echoed code").to_string();
    assert_eq!(code.len(), 6);

    let wrong = if code == "123456" { "654321" } else { "123456" };
    let (status, body) = post(
        &app,
        "/v1/register/verify",
        json!({ "challenge_id": challenge_id, "code": wrong }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_code");

    let (status, body) = post(
        &app,
        "/v1/register/verify",
        json!({ "challenge_id": challenge_id, "code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "participant");
    assert_eq!(body["user"]["department"], "Design");
    assert!(body["token"].as_str().is_some());

    // The challenge is consumed.
    let (status, _) = post(
        &app,
        "/v1/register/verify",
        json!({ "challenge_id": challenge_id, "code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(
        &app,
        "/v1/login",
        json!({ "email": "new.intern@renu.org", "password": "secret1", "role": "participant" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn registration_rejects_bad_input() {
    let app = app();
    let (status, body) = post(
        &app,
        "/v1/register",
        json!({
            "email": "intern@renu.org",
            "name": "Duplicate",
            "password": "secret1",
            "role": "participant"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "already_exists");

    let (status, body) = post(
        &app,
        "/v1/register",
        json!({
            "email": "short@renu.org",
            "name": "Short Password",
            "password": "abc",
            "role": "participant"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = post(
        &app,
        "/v1/register",
        json!({
            "email": "not-an-email",
            "name": "Bad Email",
            "password": "secret1",
            "role": "participant"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let app = app();
    let token = login(&app, "coo@renu.org", "operations_lead").await;

    let response = app
        .clone()
        .oneshot(authed_request("POST", "/v1/logout", &token))
        .await
        .expect("logout");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/v1/me", &token))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A fresh login still works.
    let token = login(&app, "coo@renu.org", "operations_lead").await;
    let response = app
        .oneshot(authed_request("GET", "/v1/me", &token))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn password_reset_replaces_the_password() {
    let app = app();
    let (status, issued) =
        post(&app, "/v1/password-reset", json!({ "email": "intern@renu.org" })).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let challenge_id = issued["challenge_id"].as_str().expect("challenge").to_string();
    let code = issued["code"].as_str().expect("code").to_string();

    let (status, body) = post(
        &app,
        "/v1/password-reset/verify",
        json!({ "challenge_id": challenge_id, "code": code, "new_password": "short" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = post(
        &app,
        "/v1/password-reset/verify",
        json!({ "challenge_id": challenge_id, "code": code, "new_password": "new-secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = post(
        &app,
        "/v1/login",
        json!({ "email": "intern@renu.org", "password": "password", "role": "participant" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = post(
        &app,
        "/v1/login",
        json!({ "email": "intern@renu.org", "password": "new-secret", "role": "participant" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn password_reset_for_unknown_email_looks_the_same() {
    let app = app();
    let (known_status, known) =
        post(&app, "/v1/password-reset", json!({ "email": "coo@renu.org" })).await;
    let (ghost_status, ghost) =
        post(&app, "/v1/password-reset", json!({ "email": "ghost@renu.org" })).await;
    assert_eq!(known_status, StatusCode::ACCEPTED);
    assert_eq!(ghost_status, StatusCode::ACCEPTED);
    assert!(ghost["challenge_id"].as_str().is_some());
    assert_eq!(known["code"].is_string(), ghost["code"].is_string());

    let verify = |issued: &serde_json::Value, code: &str| {
        json!({
            "challenge_id": issued["challenge_id"],
            "code": code,
            "new_password": "new-secret"
        })
    };
    let known_wrong = if known["code"] == "111111" { "222222" } else { "111111" };
    let (known_status, known_body) =
        post(&app, "/v1/password-reset/verify", verify(&known, known_wrong)).await;
    let (ghost_status, ghost_body) =
        post(&app, "/v1/password-reset/verify", verify(&ghost, "000000")).await;
    assert_eq!(known_status, StatusCode::BAD_REQUEST);
    assert_eq!(ghost_status, known_status);
    assert_eq!(ghost_body["code"], known_body["code"]);
    assert_eq!(ghost_body["code"], "invalid_code");

    // Even the echoed code is refused for an unknown email.
    let echoed = ghost["code"].as_str().expect("echoed code").to_string();
    let (status, body) = post(&app, "/v1/password-reset/verify", verify(&ghost, &echoed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_code");

    let mut last = StatusCode::BAD_REQUEST;
    for _ in 0..5 {
        let (status, _) = post(&app, "/v1/password-reset/verify", verify(&ghost, "000000")).await;
        last = status;
        if status != StatusCode::BAD_REQUEST {
            break;
        }
    }
    assert_eq!(last, StatusCode::GONE);
}

#[tokio::test]
async fn exhausted_attempts_expire_the_challenge() {
    let app = app();
    let (_, issued) = post(&app, "/v1/password-reset", json!({ "email": "coo@renu.org" })).await;
    let challenge_id = issued["challenge_id"].as_str().expect("challenge").to_string();
    let code = issued["code"].as_str().expect("code").to_string();
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let mut last = StatusCode::OK;
    for _ in 0..6 {
        let (status, _) = post(
            &app,
            "/v1/password-reset/verify",
            json!({ "challenge_id": challenge_id, "code": wrong, "new_password": "new-secret" }),
        )
        .await;
        last = status;
        if status != StatusCode::BAD_REQUEST {
            break;
        }
    }
    assert_eq!(last, StatusCode::GONE);

    let (status, _) = post(
        &app,
        "/v1/password-reset/verify",
        json!({ "challenge_id": challenge_id, "code": code, "new_password": "new-secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
