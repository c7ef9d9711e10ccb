//! Bootstrap/seed integration tests.
//!
//! Covers both variants of the first-request procedure: with and
//! without the schema drop.

mod common;

use common::TestApp;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn first_request_seeds_exactly_one_admin() {
    // Arrange
    let app = TestApp::spawn().await;

    // Act
    let response = app.trigger_bootstrap().await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.count_users_with_email("admin"), 1);
    assert_eq!(app.count_users(), 1);
}

#[tokio::test]
#[serial]
async fn bootstrap_runs_once_per_process() {
    // Arrange
    let app = TestApp::spawn().await;
    app.trigger_bootstrap().await;

    let email = TestApp::unique_email();
    app.register(&email, "password123").await;
    assert_eq!(app.count_users(), 2);

    // Act - a later request must not re-run the (dropping) bootstrap
    let response = app.get_public("/").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.count_users(), 2);
    assert_eq!(app.count_users_with_email(&email), 1);
}

#[tokio::test]
#[serial]
async fn rerun_without_drop_fails_on_seed_uniqueness() {
    // Arrange - seed the store once
    let app = TestApp::spawn().await;
    app.trigger_bootstrap().await;

    // Act - a second process-equivalent without the drop variant
    let second = TestApp::spawn_with(|config| {
        config.bootstrap.recreate_schema = false;
    })
    .await;
    let response = second.trigger_bootstrap().await;

    // Assert - the triggering request fails, the store is untouched
    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(second.count_users_with_email("admin"), 1);
}

#[tokio::test]
#[serial]
async fn rerun_with_drop_leaves_exactly_one_admin() {
    // Arrange - a populated store
    let app = TestApp::spawn().await;
    app.trigger_bootstrap().await;
    app.register(&TestApp::unique_email(), "password123").await;
    assert_eq!(app.count_users(), 2);

    // Act
    let second = TestApp::spawn().await;
    let response = second.trigger_bootstrap().await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(second.count_users(), 1);
    assert_eq!(second.count_users_with_email("admin"), 1);
}

#[tokio::test]
#[serial]
async fn failed_bootstrap_is_retried_by_next_request() {
    // Arrange - first app seeds the store
    let app = TestApp::spawn().await;
    app.trigger_bootstrap().await;

    // A non-dropping instance fails its first request on the seed insert
    let second = TestApp::spawn_with(|config| {
        config.bootstrap.recreate_schema = false;
    })
    .await;
    assert_eq!(second.trigger_bootstrap().await.status().as_u16(), 500);

    // Act / Assert - the guard was not poisoned into success; the next
    // request attempts the procedure again and fails the same way
    assert_eq!(second.trigger_bootstrap().await.status().as_u16(), 500);
}
