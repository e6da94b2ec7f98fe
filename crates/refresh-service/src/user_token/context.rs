//! Principals and parsed user tokens.

use chrono::{DateTime, Utc};
use std::fmt;

/// Principal kinds, with their numeric ids as carried in the `utypid` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserType {
    Integration,
    Admin,
    Customer,
    Guest,
}

impl UserType {
    pub fn id(self) -> i64 {
        match self {
            UserType::Integration => 1,
            UserType::Admin => 2,
            UserType::Customer => 3,
            UserType::Guest => 4,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(UserType::Integration),
            2 => Some(UserType::Admin),
            3 => Some(UserType::Customer),
            4 => Some(UserType::Guest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Integration => "integration",
            UserType::Admin => "admin",
            UserType::Customer => "customer",
            UserType::Guest => "guest",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Principal authenticated by a JSON Web Token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JwtUserContext {
    user_id: u64,
    user_type: UserType,
}

impl JwtUserContext {
    pub fn new(user_id: u64, user_type: UserType) -> Self {
        Self { user_id, user_type }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }
}

/// Principal authenticated by some other token scheme (opaque access
/// tokens, integration tokens).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueUserContext {
    user_id: u64,
    user_type: UserType,
    scheme: String,
}

impl OpaqueUserContext {
    pub fn new(user_id: u64, user_type: UserType, scheme: impl Into<String>) -> Self {
        Self {
            user_id,
            user_type,
            scheme: scheme.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserContext {
    Jwt(JwtUserContext),
    Opaque(OpaqueUserContext),
}

impl UserContext {
    pub fn user_id(&self) -> u64 {
        match self {
            UserContext::Jwt(ctx) => ctx.user_id,
            UserContext::Opaque(ctx) => ctx.user_id,
        }
    }

    pub fn user_type(&self) -> UserType {
        match self {
            UserContext::Jwt(ctx) => ctx.user_type,
            UserContext::Opaque(ctx) => ctx.user_type,
        }
    }
}

/// Issuance and expiry times of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserTokenData {
    issued: DateTime<Utc>,
    expires: DateTime<Utc>,
}

impl UserTokenData {
    pub fn new(issued: DateTime<Utc>, expires: DateTime<Utc>) -> Self {
        Self { issued, expires }
    }

    pub fn issued(&self) -> DateTime<Utc> {
        self.issued
    }

    pub fn expires(&self) -> DateTime<Utc> {
        self.expires
    }
}

/// A read user token. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserToken {
    user_context: UserContext,
    data: UserTokenData,
}

impl UserToken {
    pub fn new(user_context: UserContext, data: UserTokenData) -> Self {
        Self { user_context, data }
    }

    pub fn user_context(&self) -> &UserContext {
        &self.user_context
    }

    pub fn data(&self) -> &UserTokenData {
        &self.data
    }
}
