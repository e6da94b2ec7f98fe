//! Refresh service configuration.
//!
//! Loaded from environment variables. Key material is held in `SecretBox`
//! and redacted in Debug output.

use crate::crypto::{ContentKey, KeyRing, SigningKey, CONTENT_KEY_LEN};
use crate::user_token::TokenTtl;
use base64::{engine::general_purpose, Engine as _};
use common::config::ObservabilityConfig;
use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8090";

/// Default `kid` of the signing key.
pub const DEFAULT_SIGNING_KEY_ID: &str = "refresh-key-01";

/// Default admin token lifetime (4 hours).
pub const DEFAULT_ADMIN_TOKEN_TTL_SECONDS: u64 = 14_400;

/// Default customer token lifetime (1 hour).
pub const DEFAULT_CUSTOMER_TOKEN_TTL_SECONDS: u64 = 3_600;

/// Maximum accepted token lifetime (30 days).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 2_592_000;

pub struct Config {
    /// Server bind address (default: "0.0.0.0:8090").
    pub bind_address: String,

    /// Ed25519 private key, PKCS#8 DER.
    pub signing_key: SecretBox<Vec<u8>>,

    pub signing_key_id: String,

    /// AES-256-GCM content key. When present, tokens are issued as JWE.
    pub encryption_key: Option<SecretBox<Vec<u8>>>,

    pub admin_token_ttl_seconds: u64,

    pub customer_token_ttl_seconds: u64,

    /// Tolerance for `iat` values in the future.
    pub jwt_clock_skew_seconds: u64,

    pub observability: ObservabilityConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("signing_key", &"[REDACTED]")
            .field("signing_key_id", &self.signing_key_id)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("admin_token_ttl_seconds", &self.admin_token_ttl_seconds)
            .field("customer_token_ttl_seconds", &self.customer_token_ttl_seconds)
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("observability", &self.observability)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Base64 decode error in {0}: {1}")]
    Base64Error(String, base64::DecodeError),

    #[error("Invalid encryption key: {0}")]
    InvalidEncryptionKey(String),

    #[error("Invalid signing key: {0}")]
    InvalidSigningKey(String),

    #[error("Invalid token lifetime configuration: {0}")]
    InvalidTokenTtl(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let signing_key_base64 = vars
            .get("REFRESH_SIGNING_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("REFRESH_SIGNING_KEY".to_string()))?;
        let signing_key = decode_base64("REFRESH_SIGNING_KEY", signing_key_base64)?;

        let signing_key_id = vars
            .get("REFRESH_SIGNING_KEY_ID")
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_SIGNING_KEY_ID.to_string());

        let encryption_key = match vars.get("REFRESH_ENCRYPTION_KEY") {
            Some(value) => {
                let key = decode_base64("REFRESH_ENCRYPTION_KEY", value)?;
                if key.len() != CONTENT_KEY_LEN {
                    return Err(ConfigError::InvalidEncryptionKey(format!(
                        "Expected {} bytes, got {}",
                        CONTENT_KEY_LEN,
                        key.len()
                    )));
                }
                Some(SecretBox::new(Box::new(key)))
            }
            None => None,
        };

        let admin_token_ttl_seconds = parse_ttl(
            vars,
            "ADMIN_TOKEN_TTL_SECONDS",
            DEFAULT_ADMIN_TOKEN_TTL_SECONDS,
        )?;
        let customer_token_ttl_seconds = parse_ttl(
            vars,
            "CUSTOMER_TOKEN_TTL_SECONDS",
            DEFAULT_CUSTOMER_TOKEN_TTL_SECONDS,
        )?;

        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                    value
                )));
            }

            let value = value.unsigned_abs();
            if value > MAX_CLOCK_SKEW.as_secs() {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    value
                )));
            }

            value
        } else {
            DEFAULT_CLOCK_SKEW.as_secs()
        };

        Ok(Config {
            bind_address,
            signing_key: SecretBox::new(Box::new(signing_key)),
            signing_key_id,
            encryption_key,
            admin_token_ttl_seconds,
            customer_token_ttl_seconds,
            jwt_clock_skew_seconds,
            observability: ObservabilityConfig::from_vars(vars),
        })
    }

    /// Build the key ring from the configured key material.
    pub fn key_ring(&self) -> Result<KeyRing, ConfigError> {
        let signing = SigningKey::from_pkcs8(
            self.signing_key_id.clone(),
            self.signing_key.expose_secret().clone(),
        )
        .map_err(|e| ConfigError::InvalidSigningKey(e.to_string()))?;

        let content = self
            .encryption_key
            .as_ref()
            .map(|key| ContentKey::new(self.signing_key_id.clone(), key.expose_secret().clone()))
            .transpose()
            .map_err(|e| ConfigError::InvalidEncryptionKey(e.to_string()))?;

        Ok(KeyRing::new(signing, content))
    }

    pub fn token_ttl(&self) -> TokenTtl {
        TokenTtl {
            admin: seconds(self.admin_token_ttl_seconds),
            customer: seconds(self.customer_token_ttl_seconds),
        }
    }

    pub fn clock_skew(&self) -> Duration {
        Duration::from_secs(self.jwt_clock_skew_seconds)
    }
}

fn decode_base64(name: &str, value: &str) -> Result<Vec<u8>, ConfigError> {
    general_purpose::STANDARD
        .decode(value.trim())
        .map_err(|e| ConfigError::Base64Error(name.to_string(), e))
}

fn parse_ttl(vars: &HashMap<String, String>, name: &str, default: u64) -> Result<u64, ConfigError> {
    let Some(value_str) = vars.get(name) else {
        return Ok(default);
    };

    let value: u64 = value_str.parse().map_err(|e| {
        ConfigError::InvalidTokenTtl(format!(
            "{} must be a positive integer, got '{}': {}",
            name, value_str, e
        ))
    })?;

    if value == 0 || value > MAX_TOKEN_TTL_SECONDS {
        return Err(ConfigError::InvalidTokenTtl(format!(
            "{} must be between 1 and {} seconds, got {}",
            name, MAX_TOKEN_TTL_SECONDS, value
        )));
    }

    Ok(value)
}

fn seconds(value: u64) -> chrono::Duration {
    let value = value.min(MAX_TOKEN_TTL_SECONDS);
    chrono::Duration::seconds(i64::try_from(value).unwrap_or_default())
}
