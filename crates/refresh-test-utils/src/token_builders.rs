//! Builder patterns for test tokens
//!
//! Mints tokens through the service's own `JwtManager`, so they verify or
//! decrypt with the same key ring the service under test uses.

use chrono::{Duration, Utc};
use refresh_service::errors::TokenError;
use refresh_service::jwt::{
    Claim, ClaimSet, EncryptionSettings, Jwe, Jws, Jwt, JwtManager, Payload, Unsecured,
};
use refresh_service::user_token::UserType;

/// Builder for user tokens with chosen claims
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::admin()
///     .for_user(42)
///     .issued_at(1_700_000_000)
///     .expires_in(3600)
///     .build(&manager)?;
/// ```
pub struct TestTokenBuilder {
    user_id: u64,
    user_type: UserType,
    iat: i64,
    exp: i64,
    include_iat: bool,
}

impl TestTokenBuilder {
    /// Builder for the given principal type, issued a minute ago, valid for an hour
    pub fn new(user_type: UserType) -> Self {
        let now = Utc::now();
        Self {
            user_id: 1,
            user_type,
            iat: (now - Duration::seconds(60)).timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            include_iat: true,
        }
    }

    pub fn admin() -> Self {
        Self::new(UserType::Admin)
    }

    pub fn customer() -> Self {
        Self::new(UserType::Customer)
    }

    /// Set the user id (`uid`)
    pub fn for_user(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Set issued-at timestamp
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Set expiration timestamp
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = timestamp;
        self
    }

    /// Set expiration in seconds from now (negative for expired tokens)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Leave out the `iat` claim
    pub fn without_issued_at(mut self) -> Self {
        self.include_iat = false;
        self
    }

    /// Build the claim set
    pub fn build_claims(&self) -> ClaimSet {
        let mut claims = ClaimSet::new();
        claims.set(Claim::new("uid", self.user_id));
        claims.set(Claim::new("utypid", self.user_type.id()));
        if self.include_iat {
            claims.set(Claim::new("iat", self.iat));
        }
        claims.set(Claim::new("exp", self.exp));
        claims
    }

    /// Build a compact token with the manager's default settings
    pub fn build(&self, manager: &JwtManager) -> Result<String, TokenError> {
        self.build_with(manager, &manager.default_settings())
    }

    /// Build a compact token with explicit settings
    pub fn build_with(
        &self,
        manager: &JwtManager,
        settings: &EncryptionSettings,
    ) -> Result<String, TokenError> {
        let protected = JwtManager::protected_header(settings);
        let payload = Payload::Claims(self.build_claims());

        let jwt = match settings {
            EncryptionSettings::Jwe { .. } => Jwt::Jwe(Jwe {
                protected,
                shared_unprotected: None,
                per_recipient_unprotected: Vec::new(),
                payload,
            }),
            EncryptionSettings::Jws { .. } => Jwt::Jws(Jws {
                protected,
                payload,
                unprotected: None,
            }),
            EncryptionSettings::Unsecured => Jwt::Unsecured(Unsecured {
                header: protected,
                payload,
            }),
        };

        manager.create(jwt, settings)
    }
}
