//! Login and registration integration tests.

mod common;

use common::TestApp;
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn login_page_renders_with_theme() {
    let app = TestApp::spawn().await;

    let response = app.get_public("/login").await;

    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("data-theme=\"cerulean\""));
    assert!(body.contains("<form"));
}

#[tokio::test]
#[serial]
async fn seeded_admin_can_login() {
    // Arrange
    let app = TestApp::spawn().await;
    app.trigger_bootstrap().await;

    // Act
    let auth = app.login_as_admin().await;

    // Assert
    assert_eq!(auth.user.email, "admin");
    assert!(auth.user.active);
    assert!(!auth.access_token.is_empty());
}

#[tokio::test]
#[serial]
async fn login_rejects_wrong_password() {
    let app = TestApp::spawn().await;
    app.trigger_bootstrap().await;

    let response = app.login("admin", "not-the-password").await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
#[serial]
async fn login_rejects_unknown_user() {
    let app = TestApp::spawn().await;
    app.trigger_bootstrap().await;

    let response = app.login("nobody@example.com", "password123").await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
#[serial]
async fn login_rejects_inactive_account() {
    // Arrange - register a user, then deactivate it through the admin API
    let app = TestApp::spawn().await;
    let email = TestApp::unique_email();
    let user = app.register(&email, "password123").await;

    let admin = app.login_as_admin().await;
    let response = app
        .put(
            &format!("/admin/users/{}", user.user.id),
            &admin.access_token,
            json!({"active": false}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    // Act
    let response = app.login(&email, "password123").await;

    // Assert
    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"].as_str().unwrap(), "ACCOUNT_DISABLED");
}

#[tokio::test]
#[serial]
async fn registration_creates_user() {
    let app = TestApp::spawn().await;
    app.trigger_bootstrap().await;
    let email = TestApp::unique_email();

    let response = app
        .post_public("/register", json!({"email": email, "password": "password123"}))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(app.count_users_with_email(&email), 1);
}

#[tokio::test]
#[serial]
async fn registration_rejects_duplicate_email() {
    let app = TestApp::spawn().await;
    let email = TestApp::unique_email();
    app.register(&email, "password123").await;

    let response = app
        .post_public("/register", json!({"email": email, "password": "password123"}))
        .await;

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
#[serial]
async fn registration_rejects_invalid_email() {
    let app = TestApp::spawn().await;
    app.trigger_bootstrap().await;

    let response = app
        .post_public(
            "/register",
            json!({"email": "not-an-email", "password": "password123"}),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[serial]
async fn registration_refused_when_disabled() {
    // Arrange
    let app = TestApp::spawn_with(|config| {
        config.bootstrap.recreate_schema = true;
        config.security.registration_enabled = false;
    })
    .await;
    app.trigger_bootstrap().await;

    // Act
    let response = app
        .post_public(
            "/register",
            json!({"email": TestApp::unique_email(), "password": "password123"}),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 403);
    assert_eq!(app.count_users(), 1);
}
