mod common;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";

async fn forgot_password(app: &TestApp, email: &str) -> reqwest::Response {
    app.post("/api/forgot-password")
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("Failed to execute request")
}

async fn reset_password(app: &TestApp, token: &str, password: &str) -> reqwest::Response {
    app.post("/api/reset-password")
        .json(&json!({ "token": token, "password": password }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let app = TestApp::spawn().await;
    app.register("Serena", "serena@example.com", "forehand-winner")
        .await;

    let known = forgot_password(&app, "serena@example.com").await;
    let unknown = forgot_password(&app, "nobody@example.com").await;

    assert_eq!(known.status(), StatusCode::OK);
    assert_eq!(unknown.status(), StatusCode::OK);

    let known: Value = known.json().await.unwrap();
    let unknown: Value = unknown.json().await.unwrap();
    assert_eq!(known, unknown);
    assert_eq!(known["message"], FORGOT_PASSWORD_MESSAGE);

    // Only the real account got a token
    assert_eq!(app.notifier.sent_count().await, 1);
    assert!(app
        .notifier
        .last_token_for("nobody@example.com")
        .await
        .is_none());
}

#[tokio::test]
async fn test_forgot_password_requires_email() {
    let app = TestApp::spawn().await;

    let response = forgot_password(&app, "  ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_password_flow() {
    let app = TestApp::spawn().await;
    app.register("Serena", "serena@example.com", "forehand-winner")
        .await;

    forgot_password(&app, "serena@example.com").await;
    let token = app
        .notifier
        .last_token_for("serena@example.com")
        .await
        .expect("Reset token was not sent");

    let response = reset_password(&app, &token, "slice-and-dice").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Password has been reset successfully");

    let old = app
        .post("/api/login")
        .json(&json!({ "email": "serena@example.com", "password": "forehand-winner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = app
        .post("/api/login")
        .json(&json!({ "email": "serena@example.com", "password": "slice-and-dice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(new.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let app = TestApp::spawn().await;
    app.register("Serena", "serena@example.com", "forehand-winner")
        .await;

    forgot_password(&app, "serena@example.com").await;
    let token = app
        .notifier
        .last_token_for("serena@example.com")
        .await
        .unwrap();

    let first = reset_password(&app, &token, "slice-and-dice").await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = reset_password(&app, &token, "drop-shot-ace").await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_with_tampered_token() {
    let app = TestApp::spawn().await;
    app.register("Serena", "serena@example.com", "forehand-winner")
        .await;

    forgot_password(&app, "serena@example.com").await;
    let token = app
        .notifier
        .last_token_for("serena@example.com")
        .await
        .unwrap();
    let (id, _) = token.split_once('.').unwrap();

    for bad in [
        format!("{}.not-the-secret", id),
        "garbage".to_string(),
        format!("{}.", uuid::Uuid::new_v4()),
        String::new(),
    ] {
        let response = reset_password(&app, &bad, "slice-and-dice").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // The genuine token still works
    let response = reset_password(&app, &token, "slice-and-dice").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reset_rejects_weak_password() {
    let app = TestApp::spawn().await;
    app.register("Serena", "serena@example.com", "forehand-winner")
        .await;

    forgot_password(&app, "serena@example.com").await;
    let token = app
        .notifier
        .last_token_for("serena@example.com")
        .await
        .unwrap();

    let response = reset_password(&app, &token, "short").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Not consumed by the rejected attempt
    let response = reset_password(&app, &token, "slice-and-dice").await;
    assert_eq!(response.status(), StatusCode::OK);
}
