//! Integration tests for the account and token flows.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{PASSWORD, TestApp, test_config};

#[tokio::test]
async fn test_register_confirm_and_login() {
    let app = TestApp::new();
    let session = app.sign_up("alice@example.com").await;

    let response = app
        .request("GET", "/api/v1/users/me", None, Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], "alice@example.com");
    assert_eq!(response.body["name"], "Tester");
    assert!(response.body.get("password").is_none());
}

#[tokio::test]
async fn test_register_with_taken_email_conflicts() {
    let app = TestApp::new();
    app.sign_up("taken@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/users/register",
            Some(json!({ "name": "Other", "email": "taken@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["message"], "email is already taken");
}

#[tokio::test]
async fn test_register_validates_body() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/v1/users/register",
            Some(json!({ "name": "Al", "email": "nope", "password": "123" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_login_before_confirmation_requires_verification() {
    let app = TestApp::new();
    app.request(
        "POST",
        "/api/v1/users/register",
        Some(json!({ "name": "Pending", "email": "pending@example.com", "password": PASSWORD })),
        None,
    )
    .await;

    let response = app
        .request(
            "POST",
            "/api/v1/users/login",
            Some(json!({ "email": "pending@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["message"], "email has to be verified");
}

#[tokio::test]
async fn test_registration_can_be_disabled() {
    let mut config = test_config();
    config.features.registration_enabled = false;
    let app = TestApp::with_config(config);

    let response = app
        .request(
            "POST",
            "/api/v1/users/register",
            Some(json!({ "name": "Nobody", "email": "nobody@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.body["message"],
        "the endpoint has been temporarily disabled"
    );
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = TestApp::new();
    app.sign_up("bob@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/users/login",
            Some(json!({ "email": "bob@example.com", "password": "not-the-password" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "invalid user password");
}

#[tokio::test]
async fn test_missing_or_malformed_authorization() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/users/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "missing authorization token");

    let response = app
        .request("GET", "/api/v1/users/me", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "could not authorize a user");
}

#[tokio::test]
async fn test_refresh_token_is_single_use() {
    let app = TestApp::new();
    let session = app.sign_up("carol@example.com").await;

    let first = app
        .request("POST", "/api/v1/users/me/tokens", None, Some(&session.refresh))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert!(first.body["accessToken"].is_string());

    let second = app
        .request("POST", "/api/v1/users/me/tokens", None, Some(&session.refresh))
        .await;
    assert_eq!(second.status, StatusCode::UNAUTHORIZED);
    assert_eq!(second.body["message"], "could not authorize a user");
}

#[tokio::test]
async fn test_token_kinds_are_not_interchangeable() {
    let app = TestApp::new();
    let session = app.sign_up("dave@example.com").await;

    let response = app
        .request("GET", "/api/v1/users/me", None, Some(&session.refresh))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("POST", "/api/v1/users/me/tokens", None, Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_revokes_refresh_tokens() {
    let app = TestApp::new();
    let session = app.sign_up("erin@example.com").await;

    let response = app
        .request(
            "PATCH",
            "/api/v1/users/me/password",
            Some(json!({ "password": PASSWORD, "newPassword": "brand-new-password" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("POST", "/api/v1/users/me/tokens", None, Some(&session.refresh))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    app.login("erin@example.com", "brand-new-password").await;
}

#[tokio::test]
async fn test_password_reset_needs_token_and_cookie() {
    let app = TestApp::new();
    let session = app.sign_up("frank@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/users/reset-password",
            Some(json!({ "email": "frank@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    let cookie = response.cookie("rps").expect("rps cookie");
    let raw = response
        .headers
        .get(axum::http::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(raw.contains("Path=/api/v1/users/reset-password"));
    assert!(raw.contains("HttpOnly"));
    let token = app.next_mail_token().await;

    // The token alone is not enough.
    let response = app
        .request(
            "PATCH",
            "/api/v1/users/reset-password",
            Some(json!({ "password": "after-reset" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.cookie("rps").as_deref(), Some("rps="));

    let response = app
        .request_with_cookie(
            "PATCH",
            "/api/v1/users/reset-password",
            Some(json!({ "password": "after-reset" })),
            Some(&token),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.cookie("rps").as_deref(), Some("rps="));

    let response = app
        .request("POST", "/api/v1/users/me/tokens", None, Some(&session.refresh))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    app.login("frank@example.com", "after-reset").await;
}

#[tokio::test]
async fn test_reset_cookie_from_another_request_is_rejected() {
    let app = TestApp::new();
    app.sign_up("gina@example.com").await;

    let first = app
        .request(
            "POST",
            "/api/v1/users/reset-password",
            Some(json!({ "email": "gina@example.com" })),
            None,
        )
        .await;
    let token = app.next_mail_token().await;

    let second = app
        .request(
            "POST",
            "/api/v1/users/reset-password",
            Some(json!({ "email": "gina@example.com" })),
            None,
        )
        .await;
    let foreign_cookie = second.cookie("rps").unwrap();
    assert_ne!(first.cookie("rps"), Some(foreign_cookie.clone()));

    let response = app
        .request_with_cookie(
            "PATCH",
            "/api/v1/users/reset-password",
            Some(json!({ "password": "after-reset" })),
            Some(&token),
            Some(&foreign_cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reset_for_unknown_email_looks_the_same() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/v1/users/reset-password",
            Some(json!({ "email": "ghost@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert!(response.cookie("rps").is_some());
}

#[tokio::test]
async fn test_delete_account_requires_password() {
    let app = TestApp::new();
    let session = app.sign_up("henry@example.com").await;

    let response = app
        .request(
            "DELETE",
            "/api/v1/users/me",
            Some(json!({ "password": "wrong-password" })),
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "DELETE",
            "/api/v1/users/me",
            Some(json!({ "password": PASSWORD })),
            Some(&session.access),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("GET", "/api/v1/users/me", None, Some(&session.access))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "user not found");
}
