//! Admin token refresh.
//!
//! Re-issues a valid admin token with a later expiry while keeping the
//! original `iat`. Revocation compares against `iat`, so a refreshed token
//! stays revocable together with the session it came from.

use super::issued_at_override::IssuedAtOverride;
use crate::errors::{RefreshError, ADMIN_TOKENS_ONLY, JWT_TOKENS_ONLY};
use crate::jwt::IssuedAtFactory;
use crate::observability::{hash_for_correlation, metrics};
use crate::user_token::{
    UserContext, UserToken, UserTokenIssuer, UserTokenParametersFactory, UserTokenReader,
    UserTokenValidator, UserType,
};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Read access to the current request's headers.
pub trait RequestContext {
    fn header(&self, name: &str) -> Option<&str>;
}

impl RequestContext for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| value.to_str().ok())
    }
}

pub struct JwtRefreshService {
    reader: Arc<dyn UserTokenReader>,
    validator: Arc<dyn UserTokenValidator>,
    issuer: Arc<dyn UserTokenIssuer>,
    params_factory: UserTokenParametersFactory,
    issued_at_factory: IssuedAtFactory,
    token: Option<String>,
}

impl JwtRefreshService {
    pub fn new(
        reader: Arc<dyn UserTokenReader>,
        validator: Arc<dyn UserTokenValidator>,
        issuer: Arc<dyn UserTokenIssuer>,
    ) -> Self {
        Self {
            reader,
            validator,
            issuer,
            params_factory: UserTokenParametersFactory,
            issued_at_factory: IssuedAtFactory,
            token: None,
        }
    }

    /// Refresh this token instead of the request's bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Issue a new admin token that keeps the original `iat`.
    ///
    /// # Errors
    ///
    /// - `AuthFailure` - missing or malformed bearer credential, a token that
    ///   fails to read or validate, or a non-admin principal
    /// - `InvalidInput` - the credential is valid but not a JWT
    /// - `ClaimOverride` / `Issuance` - the new token could not be built
    #[instrument(skip_all, name = "refresh.admin_token")]
    pub fn refresh_admin_token(&self, request: &dyn RequestContext) -> Result<String, RefreshError> {
        let start = Instant::now();
        let result = self.refresh(request);

        match &result {
            Ok(_) => metrics::record_refresh("success", None, start.elapsed()),
            Err(e) => {
                tracing::debug!(target: "refresh.service", error = %e, "Refresh rejected");
                metrics::record_refresh("error", Some(e.category()), start.elapsed());
            }
        }

        result
    }

    fn refresh(&self, request: &dyn RequestContext) -> Result<String, RefreshError> {
        let token = self.resolve_token(request)?;
        let user_token = self.read_and_validate(token)?;

        let UserContext::Jwt(context) = user_token.user_context() else {
            return Err(RefreshError::InvalidInput(JWT_TOKENS_ONLY.to_string()));
        };
        if context.user_type() != UserType::Admin {
            tracing::debug!(
                target: "refresh.service",
                user_type = %context.user_type(),
                "Refresh rejected: not an admin token"
            );
            return Err(RefreshError::AuthFailure(ADMIN_TOKENS_ONLY.to_string()));
        }

        let issued = user_token.data().issued();
        let mut issued_at_override = IssuedAtOverride::new();
        issued_at_override.set_pending_issued_at(self.issued_at_factory.create(issued, true));

        let params = self.params_factory.create();
        let new_token =
            self.issuer
                .create(user_token.user_context(), &params, &[&issued_at_override])?;

        tracing::info!(
            target: "refresh.service",
            user = %hash_for_correlation(&context.user_id().to_string()),
            "Admin token refreshed"
        );

        Ok(new_token)
    }

    fn resolve_token<'a>(&'a self, request: &'a dyn RequestContext) -> Result<&'a str, RefreshError> {
        // An empty explicit token counts as unset
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(token);
        }

        let header = request
            .header(AUTHORIZATION.as_str())
            .ok_or_else(RefreshError::invalid_bearer_token)?;

        parse_bearer(header).ok_or_else(|| {
            tracing::debug!(target: "refresh.service", "Refresh rejected: malformed authorization header");
            RefreshError::invalid_bearer_token()
        })
    }

    fn read_and_validate(&self, token: &str) -> Result<UserToken, RefreshError> {
        let result = self
            .reader
            .read(token)
            .and_then(|user_token| self.validator.validate(&user_token).map(|()| user_token));

        match result {
            Ok(user_token) => {
                metrics::record_token_validation("success", None);
                Ok(user_token)
            }
            Err(e) => {
                // Detail stays in the logs; callers only see the generic message
                tracing::debug!(target: "refresh.service", error = %e, "Bearer token rejected");
                metrics::record_token_validation("error", Some(e.category()));
                Err(RefreshError::invalid_bearer_token())
            }
        }
    }
}

/// Token part of `Bearer <token>`: exactly two space-separated parts, scheme
/// matched case-insensitively.
fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}
