use super::context::UserToken;
use super::revocation::RevokedTokenRegistry;
use crate::errors::TokenError;
use chrono::Utc;
use common::jwt::{validate_iat, DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub trait UserTokenValidator: Send + Sync {
    fn validate(&self, token: &UserToken) -> Result<(), TokenError>;
}

/// Checks expiry, issue time and revocation of a read token.
pub struct JwtUserTokenValidator {
    revocations: Arc<dyn RevokedTokenRegistry>,
    clock_skew: Duration,
}

impl JwtUserTokenValidator {
    pub fn new(revocations: Arc<dyn RevokedTokenRegistry>) -> Self {
        Self {
            revocations,
            clock_skew: DEFAULT_CLOCK_SKEW,
        }
    }

    /// Tolerance for `iat` in the future, capped at `MAX_CLOCK_SKEW`.
    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew.min(MAX_CLOCK_SKEW);
        self
    }
}

impl UserTokenValidator for JwtUserTokenValidator {
    #[instrument(skip_all)]
    fn validate(&self, token: &UserToken) -> Result<(), TokenError> {
        let data = token.data();

        if data.expires() <= Utc::now() {
            tracing::debug!(target: "user_token.validator", "Token rejected: expired");
            return Err(TokenError::Expired);
        }

        validate_iat(data.issued().timestamp(), self.clock_skew)?;

        let context = token.user_context();
        if self
            .revocations
            .is_revoked(context.user_type(), context.user_id(), data.issued())
        {
            tracing::debug!(target: "user_token.validator", "Token rejected: revoked");
            return Err(TokenError::Revoked);
        }

        Ok(())
    }
}
