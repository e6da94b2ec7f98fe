//! Integration tests for the health and metrics endpoints.

use refresh_test_utils::{KeyMode, TestRefreshServer};
use reqwest::StatusCode;

/// `/health` returns 200 OK while the process serves HTTP.
#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;

    // Act
    let response = reqwest::get(format!("{}/health", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

/// `/metrics` serves Prometheus text format.
///
/// Only one server per test process owns the global recorder, so the body
/// content is not asserted here.
#[tokio::test]
async fn test_metrics_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;

    // Act
    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
