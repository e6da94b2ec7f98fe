//! Issuing user tokens.

use super::context::{UserContext, UserType};
use super::parameters::UserTokenParameters;
use crate::errors::IssueError;
use crate::jwt::claims::{EXPIRATION, JWT_ID, USER_ID, USER_TYPE_ID};
use crate::jwt::{
    BeforeCreateHook, Claim, ClaimSet, EncryptionSettings, IssuedAtFactory, Jwe, Jws, Jwt,
    JwtManager, Payload,
};
use crate::observability::hash_for_correlation;
use chrono::Duration;
use std::sync::Arc;
use tracing::instrument;

pub trait UserTokenIssuer: Send + Sync {
    /// Issue a token for `context`.
    ///
    /// `hooks` run in order on the assembled envelope right before it is
    /// signed or encrypted, and apply to this call only.
    fn create(
        &self,
        context: &UserContext,
        params: &UserTokenParameters,
        hooks: &[&dyn BeforeCreateHook],
    ) -> Result<String, IssueError>;
}

/// Token lifetimes by principal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl {
    pub admin: Duration,
    pub customer: Duration,
}

impl TokenTtl {
    pub fn for_user_type(&self, user_type: UserType) -> Duration {
        match user_type {
            UserType::Admin | UserType::Integration => self.admin,
            UserType::Customer | UserType::Guest => self.customer,
        }
    }
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            admin: Duration::hours(4),
            customer: Duration::hours(1),
        }
    }
}

/// Issues JWS or JWE tokens, depending on its encryption settings.
///
/// Claims, in order: `uid`, `utypid`, `iat`, `exp`, `jti`.
pub struct JwtUserTokenIssuer {
    manager: Arc<JwtManager>,
    settings: EncryptionSettings,
    ttl: TokenTtl,
    issued_at_factory: IssuedAtFactory,
}

impl JwtUserTokenIssuer {
    /// Issuer using the manager's default settings.
    pub fn new(manager: Arc<JwtManager>, ttl: TokenTtl) -> Self {
        let settings = manager.default_settings();
        Self::with_settings(manager, settings, ttl)
    }

    pub fn with_settings(
        manager: Arc<JwtManager>,
        settings: EncryptionSettings,
        ttl: TokenTtl,
    ) -> Self {
        Self {
            manager,
            settings,
            ttl,
            issued_at_factory: IssuedAtFactory,
        }
    }

    fn claims(
        &self,
        context: &UserContext,
        params: &UserTokenParameters,
    ) -> Result<ClaimSet, IssueError> {
        let issued_at = params.issued_at();
        let expires_at = issued_at
            .checked_add_signed(self.ttl.for_user_type(context.user_type()))
            .ok_or(IssueError::ExpiryOutOfRange)?;

        let mut claims = ClaimSet::new();
        claims.insert(Claim::new(USER_ID, context.user_id()))?;
        claims.insert(Claim::new(USER_TYPE_ID, context.user_type().id()))?;
        claims.insert(self.issued_at_factory.create(issued_at, false))?;
        claims.insert(Claim::new(EXPIRATION, expires_at.timestamp()))?;
        claims.insert(Claim::new(JWT_ID, uuid::Uuid::new_v4().to_string()))?;
        Ok(claims)
    }

    fn envelope(&self, claims: ClaimSet) -> Jwt {
        let protected = JwtManager::protected_header(&self.settings);
        let payload = Payload::Claims(claims);

        match &self.settings {
            EncryptionSettings::Jwe { .. } => Jwt::Jwe(Jwe {
                protected,
                shared_unprotected: None,
                per_recipient_unprotected: Vec::new(),
                payload,
            }),
            EncryptionSettings::Jws { .. } | EncryptionSettings::Unsecured => Jwt::Jws(Jws {
                protected,
                payload,
                unprotected: None,
            }),
        }
    }
}

impl UserTokenIssuer for JwtUserTokenIssuer {
    #[instrument(skip_all, fields(user_type = %context.user_type(), hooks = hooks.len()))]
    fn create(
        &self,
        context: &UserContext,
        params: &UserTokenParameters,
        hooks: &[&dyn BeforeCreateHook],
    ) -> Result<String, IssueError> {
        let mut jwt = self.envelope(self.claims(context, params)?);
        let mut settings = self.settings.clone();

        for hook in hooks {
            (jwt, settings) = hook.before_create(jwt, settings)?;
        }

        let token = self.manager.create(jwt, &settings)?;

        tracing::debug!(
            target: "user_token.issuer",
            user = %hash_for_correlation(&context.user_id().to_string()),
            kind = settings.kind(),
            "Token issued"
        );

        Ok(token)
    }
}
