//! Token envelopes and the settings used to secure them.

use super::claims::ClaimSet;
use super::header::JoseHeader;
use crate::crypto::{ContentKey, SigningKey};
use crate::errors::TokenError;
use serde_json::Value;
use std::sync::Arc;

/// Token payload: a claim set, or bytes that are not a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Claims(ClaimSet),
    Raw(Vec<u8>),
}

impl Payload {
    /// Interpret decoded payload bytes. Anything other than a JSON object is
    /// kept as raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Payload::Claims(ClaimSet::from(map)),
            _ => Payload::Raw(bytes),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TokenError> {
        match self {
            Payload::Claims(claims) => serde_json::to_vec(claims)
                .map_err(|e| TokenError::Malformed(format!("claim set serialization: {}", e))),
            Payload::Raw(bytes) => Ok(bytes.clone()),
        }
    }

    pub fn claims(&self) -> Option<&ClaimSet> {
        match self {
            Payload::Claims(claims) => Some(claims),
            Payload::Raw(_) => None,
        }
    }
}

/// Signed token.
#[derive(Debug, Clone, PartialEq)]
pub struct Jws {
    pub protected: JoseHeader,
    pub payload: Payload,
    pub unprotected: Option<JoseHeader>,
}

/// Encrypted token.
#[derive(Debug, Clone, PartialEq)]
pub struct Jwe {
    pub protected: JoseHeader,
    pub shared_unprotected: Option<JoseHeader>,
    pub per_recipient_unprotected: Vec<JoseHeader>,
    pub payload: Payload,
}

/// `alg: none` token.
#[derive(Debug, Clone, PartialEq)]
pub struct Unsecured {
    pub header: JoseHeader,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Jwt {
    Jws(Jws),
    Jwe(Jwe),
    Unsecured(Unsecured),
}

impl Jwt {
    pub fn payload(&self) -> &Payload {
        match self {
            Jwt::Jws(jws) => &jws.payload,
            Jwt::Jwe(jwe) => &jwe.payload,
            Jwt::Unsecured(unsecured) => &unsecured.payload,
        }
    }

    pub fn protected_header(&self) -> &JoseHeader {
        match self {
            Jwt::Jws(jws) => &jws.protected,
            Jwt::Jwe(jwe) => &jwe.protected,
            Jwt::Unsecured(unsecured) => &unsecured.header,
        }
    }

    pub fn claims(&self) -> Option<&ClaimSet> {
        self.payload().claims()
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Jwt::Jws(_) => "jws",
            Jwt::Jwe(_) => "jwe",
            Jwt::Unsecured(_) => "unsecured",
        }
    }
}

/// How a token is secured when it is serialized.
#[derive(Debug, Clone)]
pub enum EncryptionSettings {
    /// Sign with EdDSA.
    Jws { key: Arc<SigningKey> },
    /// Encrypt directly with an AES-256-GCM content key.
    Jwe { key: Arc<ContentKey> },
    Unsecured,
}

impl EncryptionSettings {
    pub fn kind(&self) -> &'static str {
        match self {
            EncryptionSettings::Jws { .. } => "jws",
            EncryptionSettings::Jwe { .. } => "jwe",
            EncryptionSettings::Unsecured => "unsecured",
        }
    }
}
