//! Index route integration tests.

mod common;

use common::TestApp;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn index_returns_greeting() {
    // Arrange
    let app = TestApp::spawn().await;

    // Act
    let response = app.get_public("/").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let body = response.text().await.expect("Failed to read body");
    assert_eq!(body, "<h1>Hey</h1>");
}

#[tokio::test]
#[serial]
async fn unknown_route_returns_404() {
    let app = TestApp::spawn().await;

    let response = app.get_public("/no-such-page").await;

    assert_eq!(response.status().as_u16(), 404);
}
