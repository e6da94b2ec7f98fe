//! Reading bearer tokens into user tokens.

use super::context::{JwtUserContext, UserContext, UserToken, UserTokenData, UserType};
use crate::errors::TokenError;
use crate::jwt::claims::{ClaimSet, USER_ID, USER_TYPE_ID};
use crate::jwt::JwtManager;
use std::sync::Arc;
use tracing::instrument;

pub trait UserTokenReader: Send + Sync {
    /// Parse and authenticate a bearer token.
    fn read(&self, token: &str) -> Result<UserToken, TokenError>;
}

/// Reads JWS and JWE tokens issued by this service.
///
/// Required claims: `uid`, `utypid`, `iat`, `exp`.
#[derive(Debug, Clone)]
pub struct JwtUserTokenReader {
    manager: Arc<JwtManager>,
}

impl JwtUserTokenReader {
    pub fn new(manager: Arc<JwtManager>) -> Self {
        Self { manager }
    }
}

impl UserTokenReader for JwtUserTokenReader {
    #[instrument(skip_all)]
    fn read(&self, token: &str) -> Result<UserToken, TokenError> {
        let jwt = self.manager.read(token)?;
        let claims = jwt
            .claims()
            .ok_or_else(|| TokenError::InvalidClaim("payload is not a claim set".to_string()))?;

        let user_id = claims
            .get(USER_ID)
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| TokenError::InvalidClaim(USER_ID.to_string()))?;
        let user_type = claims
            .get(USER_TYPE_ID)
            .and_then(serde_json::Value::as_i64)
            .and_then(UserType::from_id)
            .ok_or_else(|| TokenError::InvalidClaim(USER_TYPE_ID.to_string()))?;

        Ok(UserToken::new(
            UserContext::Jwt(JwtUserContext::new(user_id, user_type)),
            token_data(claims)?,
        ))
    }
}

fn token_data(claims: &ClaimSet) -> Result<UserTokenData, TokenError> {
    let issued = claims
        .issued_at()
        .ok_or_else(|| TokenError::InvalidClaim("iat".to_string()))?;
    let expires = claims
        .expires_at()
        .ok_or_else(|| TokenError::InvalidClaim("exp".to_string()))?;
    Ok(UserTokenData::new(issued, expires))
}
