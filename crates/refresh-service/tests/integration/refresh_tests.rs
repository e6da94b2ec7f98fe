//! End-to-end tests for `POST /api/v1/admin/token/refresh`.
//!
//! Every refresh must keep the original `iat` and push `exp` forward, for
//! signed and encrypted tokens alike.

use chrono::{Duration, TimeZone, Utc};
use refresh_service::user_token::UserType;
use refresh_test_utils::{
    read_claims, KeyMode, TestRefreshServer, TestTokenBuilder, TokenAssertions,
    TEST_SIGNING_KEY_ID,
};
use reqwest::StatusCode;
use serde_json::Value;

fn an_hour_ago() -> i64 {
    (Utc::now() - Duration::hours(1)).timestamp()
}

async fn error_code(response: reqwest::Response) -> Result<String, anyhow::Error> {
    let body: Value = response.json().await?;
    Ok(body["error"]["code"].as_str().unwrap_or_default().to_string())
}

// ============================================================================
// Successful refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_signed_admin_token_keeps_issued_at() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;
    let iat = an_hour_ago();
    let token = TestTokenBuilder::admin()
        .for_user(42)
        .issued_at(iat)
        .expires_in(60)
        .build(server.manager())?;
    let old_exp = Utc::now().timestamp() + 60;

    // Act
    let refreshed = server.refresh(&token).await?;

    // Assert
    refreshed
        .assert_valid_jws()
        .assert_signed_by(TEST_SIGNING_KEY_ID)
        .assert_issued_at(server.manager(), iat)
        .assert_expires_after(server.manager(), old_exp);

    let claims = read_claims(&refreshed, server.manager());
    assert_eq!(claims.get("uid"), Some(&Value::from(42)));
    assert_eq!(claims.get("utypid"), Some(&Value::from(UserType::Admin.id())));
    assert!(claims.get("jti").and_then(Value::as_str).is_some());

    Ok(())
}

#[tokio::test]
async fn test_refresh_encrypted_admin_token_keeps_issued_at() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Encrypted).await?;
    let iat = an_hour_ago();
    let token = TestTokenBuilder::admin()
        .issued_at(iat)
        .build(server.manager())?;
    token.assert_valid_jwe();

    // Act
    let refreshed = server.refresh(&token).await?;

    // Assert
    refreshed
        .assert_valid_jwe()
        .assert_issued_at(server.manager(), iat);

    Ok(())
}

#[tokio::test]
async fn test_repeated_refresh_never_moves_issued_at() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;
    let iat = an_hour_ago();
    let mut token = TestTokenBuilder::admin()
        .issued_at(iat)
        .build(server.manager())?;

    // Act
    for _ in 0..3 {
        token = server.refresh(&token).await?;
    }

    // Assert
    token.assert_issued_at(server.manager(), iat);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_refreshes_keep_their_own_issued_at() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;
    let first_iat = an_hour_ago();
    let second_iat = first_iat - 600;
    let first = TestTokenBuilder::admin()
        .for_user(1)
        .issued_at(first_iat)
        .build(server.manager())?;
    let second = TestTokenBuilder::admin()
        .for_user(2)
        .issued_at(second_iat)
        .build(server.manager())?;

    // Act
    let (first_refreshed, second_refreshed) =
        tokio::join!(server.refresh(&first), server.refresh(&second));

    // Assert
    first_refreshed?.assert_issued_at(server.manager(), first_iat);
    second_refreshed?.assert_issued_at(server.manager(), second_iat);

    Ok(())
}

// ============================================================================
// Rejected requests
// ============================================================================

#[tokio::test]
async fn test_missing_authorization_is_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;

    // Act
    let response = server.post_refresh(None).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await?, "AUTH_FAILURE");

    Ok(())
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;
    let token = TestTokenBuilder::admin().build(server.manager())?;

    // Act
    let response = server
        .post_refresh(Some(&format!("Basic {}", token)))
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_customer_token_is_rejected() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;
    let token = TestTokenBuilder::customer().build(server.manager())?;

    // Act
    let response = server
        .post_refresh(Some(&format!("Bearer {}", token)))
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(
        body["error"]["message"],
        "This endpoint can only be used to refresh admin user tokens"
    );

    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_rejected() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;
    let token = TestTokenBuilder::admin()
        .issued_at(an_hour_ago())
        .expires_in(-60)
        .build(server.manager())?;

    // Act
    let response = server
        .post_refresh(Some(&format!("Bearer {}", token)))
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["message"], "Invalid bearer token");

    Ok(())
}

#[tokio::test]
async fn test_token_without_issued_at_is_rejected() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;
    let token = TestTokenBuilder::admin()
        .without_issued_at()
        .build(server.manager())?;

    // Act
    let response = server
        .post_refresh(Some(&format!("Bearer {}", token)))
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["message"], "Invalid bearer token");

    Ok(())
}

#[tokio::test]
async fn test_token_signed_by_other_key_is_rejected() -> Result<(), anyhow::Error> {
    // Arrange
    let issuer = TestRefreshServer::spawn_with_seed(1, KeyMode::Signed).await?;
    let other = TestRefreshServer::spawn_with_seed(2, KeyMode::Signed).await?;
    let token = TestTokenBuilder::admin().build(issuer.manager())?;

    // Act
    let response = other
        .post_refresh(Some(&format!("Bearer {}", token)))
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_revoked_session_cannot_be_refreshed() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestRefreshServer::spawn(KeyMode::Signed).await?;
    let iat = an_hour_ago();
    let token = TestTokenBuilder::admin()
        .for_user(9)
        .issued_at(iat)
        .build(server.manager())?;
    let refreshed = server.refresh(&token).await?;

    let cutoff = Utc
        .timestamp_opt(iat, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("invalid timestamp"))?;
    server.revocations().revoke(UserType::Admin, 9, cutoff);

    // Act
    let response = server
        .post_refresh(Some(&format!("Bearer {}", refreshed)))
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
