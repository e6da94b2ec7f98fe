//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for every sensitive value in the
//! token refresher: bearer tokens, Ed25519 private keys and AES content keys.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so any
//! struct deriving `Debug` around them logs safely. Secrets are zeroized on
//! drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct RefreshRequest {
//!     bearer_token: SecretString,
//! }
//!
//! let req = RefreshRequest {
//!     bearer_token: SecretString::from("eyJhbGciOiJFZERTQSJ9.e30.c2ln"),
//! };
//!
//! // Safe: the token is redacted
//! let rendered = format!("{req:?}");
//! assert!(!rendered.contains("eyJhbGci"));
//!
//! // Access requires an explicit call
//! let token: &str = req.bearer_token.expose_secret();
//! assert!(token.starts_with("eyJ"));
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for:
//! - Bearer tokens received from callers
//! - Base64-encoded key material read from the environment
//!
//! Use `SecretBox<Vec<u8>>` for:
//! - Ed25519 PKCS#8 private keys
//! - AES-256-GCM content keys

pub use secrecy::{ExposeSecret, SecretBox, SecretString};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("eyJhbGciOiJkaXIifQ..iv.ct.tag");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("eyJhbGci"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("bearer-value");
        assert_eq!(secret.expose_secret(), "bearer-value");
    }

    #[test]
    fn test_secret_box_key_material_is_redacted() {
        let key = SecretBox::new(Box::new(vec![0xAB_u8; 32]));
        let debug_str = format!("{key:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("171"));
        assert_eq!(key.expose_secret().len(), 32);
    }

    #[test]
    fn test_deserialize() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct KeyConfig {
            key_id: String,
            signing_key: SecretString,
        }

        let json = r#"{"key_id": "refresh-key-01", "signing_key": "MC4CAQAwBQYDK2VwBCIEIA"}"#;
        let config: KeyConfig = serde_json::from_str(json).expect("deserialize");

        assert_eq!(config.signing_key.expose_secret(), "MC4CAQAwBQYDK2VwBCIEIA");

        let debug = format!("{config:?}");
        assert!(debug.contains("refresh-key-01"));
        assert!(!debug.contains("MC4CAQAw"));
    }
}
