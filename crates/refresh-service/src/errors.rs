use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::jwt::JwtValidationError;
use serde::Serialize;
use thiserror::Error;

/// Generic message for every rejected bearer credential.
pub const INVALID_BEARER_TOKEN: &str = "Invalid bearer token";

/// Message for valid tokens that belong to a non-admin principal.
pub const ADMIN_TOKENS_ONLY: &str = "This endpoint can only be used to refresh admin user tokens";

/// Message for valid credentials that are not JSON Web Tokens.
pub const JWT_TOKENS_ONLY: &str = "This endpoint can only be used to refresh JSON Web Tokens";

/// Internal token failures raised while reading, validating or serializing.
///
/// These carry enough detail for debug logs; they never reach callers
/// directly (see [`RefreshError`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token exceeds maximum size")]
    TooLarge,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token cannot be represented in compact serialization: {0}")]
    UnsupportedSerialization(String),

    #[error("token key id does not match a configured key")]
    UnknownKey,

    #[error("signature verification failed")]
    BadSignature,

    #[error("payload decryption failed")]
    Decryption,

    #[error("missing or invalid claim: {0}")]
    InvalidClaim(String),

    #[error("token has expired")]
    Expired,

    #[error("token issued too far in the future")]
    IssuedInFuture,

    #[error("token has been revoked")]
    Revoked,

    #[error("cryptographic error: {0}")]
    Crypto(String),
}

impl From<JwtValidationError> for TokenError {
    fn from(err: JwtValidationError) -> Self {
        match err {
            JwtValidationError::TokenTooLarge => TokenError::TooLarge,
            JwtValidationError::MalformedToken => {
                TokenError::Malformed("invalid compact serialization".to_string())
            }
            JwtValidationError::IatTooFarInFuture => TokenError::IssuedInFuture,
        }
    }
}

impl TokenError {
    /// Bounded label for validation metrics.
    pub fn category(&self) -> &'static str {
        match self {
            TokenError::TooLarge
            | TokenError::Malformed(_)
            | TokenError::UnsupportedAlgorithm(_)
            | TokenError::UnsupportedSerialization(_)
            | TokenError::InvalidClaim(_) => "malformed",
            TokenError::UnknownKey | TokenError::BadSignature | TokenError::Decryption => {
                "cryptographic"
            }
            TokenError::Expired | TokenError::IssuedInFuture => "expired",
            TokenError::Revoked => "revoked",
            TokenError::Crypto(_) => "internal",
        }
    }
}

/// Errors raised by a claim-construction hook right before a token is
/// signed or encrypted.
///
/// These indicate an integration problem in the issuing pipeline, not a bad
/// caller credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterceptorError {
    #[error("unhandled token type (JWS and JWE are supported)")]
    UnsupportedTokenKind,

    #[error("JWT payload does not contain claims")]
    MalformedPayload,
}

/// Errors raised while building a claim set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("duplicate claim: {0}")]
    Duplicate(String),
}

/// Errors raised by a token issuer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error("claim hook failed: {0}")]
    Hook(#[from] InterceptorError),

    #[error("claim set rejected: {0}")]
    Claim(#[from] ClaimError),

    #[error("token creation failed: {0}")]
    Token(#[from] TokenError),

    #[error("token expiry out of range")]
    ExpiryOutOfRange,
}

/// Caller-facing errors of the refresh operation.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Missing, malformed, invalid, revoked or non-admin bearer credential.
    #[error("{0}")]
    AuthFailure(String),

    /// Valid credential of the wrong kind (not a JWT).
    #[error("{0}")]
    InvalidInput(String),

    /// The issued-at override could not be applied to the new token.
    #[error("Unable to override issue date claim of JWT - {0}")]
    ClaimOverride(InterceptorError),

    #[error("Token issuance failed: {0}")]
    Issuance(String),
}

impl RefreshError {
    /// The generic rejection for any unusable bearer credential.
    pub fn invalid_bearer_token() -> Self {
        RefreshError::AuthFailure(INVALID_BEARER_TOKEN.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RefreshError::AuthFailure(_) => StatusCode::UNAUTHORIZED,
            RefreshError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RefreshError::ClaimOverride(_) | RefreshError::Issuance(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Bounded label for refresh metrics.
    pub fn category(&self) -> &'static str {
        match self {
            RefreshError::AuthFailure(_) => "authentication",
            RefreshError::InvalidInput(_) => "invalid_input",
            RefreshError::ClaimOverride(_) | RefreshError::Issuance(_) => "internal",
        }
    }
}

impl From<IssueError> for RefreshError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::Hook(e) => RefreshError::ClaimOverride(e),
            other => RefreshError::Issuance(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for RefreshError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            RefreshError::AuthFailure(message) => ("AUTH_FAILURE", message.clone()),
            RefreshError::InvalidInput(message) => ("INVALID_INPUT", message.clone()),
            RefreshError::ClaimOverride(_) | RefreshError::Issuance(_) => {
                tracing::error!(target: "refresh.errors", error = %self, "Token refresh failed internally");
                ("INTERNAL_ERROR", "An internal error occurred".to_string())
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: RefreshError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_auth_failure_maps_to_401() {
        let (status, body) = body_json(RefreshError::invalid_bearer_token()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_FAILURE");
        assert_eq!(body["error"]["message"], INVALID_BEARER_TOKEN);
    }

    #[tokio::test]
    async fn test_invalid_input_maps_to_400() {
        let (status, body) =
            body_json(RefreshError::InvalidInput(JWT_TOKENS_ONLY.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
        assert_eq!(body["error"]["message"], JWT_TOKENS_ONLY);
    }

    #[tokio::test]
    async fn test_internal_errors_hide_detail() {
        let (status, body) =
            body_json(RefreshError::ClaimOverride(InterceptorError::MalformedPayload)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("payload"));
    }

    #[test]
    fn test_issue_error_conversion_keeps_hook_errors_distinct() {
        let hook: RefreshError = IssueError::Hook(InterceptorError::UnsupportedTokenKind).into();
        assert!(matches!(
            hook,
            RefreshError::ClaimOverride(InterceptorError::UnsupportedTokenKind)
        ));

        let token: RefreshError = IssueError::Token(TokenError::Decryption).into();
        assert!(matches!(token, RefreshError::Issuance(_)));
        assert_eq!(token.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_jwt_validation_errors_convert() {
        assert_eq!(
            TokenError::from(JwtValidationError::TokenTooLarge),
            TokenError::TooLarge
        );
        assert_eq!(
            TokenError::from(JwtValidationError::IatTooFarInFuture),
            TokenError::IssuedInFuture
        );
        assert_eq!(TokenError::Revoked.category(), "revoked");
    }
}
