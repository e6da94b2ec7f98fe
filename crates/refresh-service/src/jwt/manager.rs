//! Compact serialization of token envelopes.
//!
//! Supported forms:
//! - JWS: `b64(header).b64(payload).b64(signature)`, EdDSA
//! - JWE: `b64(header)..b64(iv).b64(ciphertext).b64(tag)`, `dir` + `A256GCM`,
//!   with the encoded protected header as AAD
//! - Unsecured: `b64(header).b64(payload).`, write-only
//!
//! Unprotected JWS/JWE headers have no place in compact form, so envelopes
//! carrying them cannot be serialized here.

use super::envelope::{EncryptionSettings, Jwe, Jws, Jwt, Payload, Unsecured};
use super::header::JoseHeader;
use crate::crypto::{self, KeyRing, SealedPayload};
use crate::errors::TokenError;
use common::jwt::{decode_segment, encode_segment, split_compact, CompactForm};
use std::sync::Arc;
use tracing::instrument;

pub const ALG_EDDSA: &str = "EdDSA";
pub const ALG_DIR: &str = "dir";
pub const ALG_NONE: &str = "none";
pub const ENC_A256GCM: &str = "A256GCM";
pub const TYP_JWT: &str = "JWT";

/// Reads and writes compact tokens with the configured keys.
#[derive(Debug, Clone)]
pub struct JwtManager {
    keys: KeyRing,
}

impl JwtManager {
    pub fn new(keys: KeyRing) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &KeyRing {
        &self.keys
    }

    /// Settings for newly issued tokens: encrypted when a content key is
    /// configured, signed otherwise.
    pub fn default_settings(&self) -> EncryptionSettings {
        match &self.keys.content {
            Some(key) => EncryptionSettings::Jwe {
                key: Arc::clone(key),
            },
            None => EncryptionSettings::Jws {
                key: Arc::clone(&self.keys.signing),
            },
        }
    }

    /// Protected header matching `settings`.
    pub fn protected_header(settings: &EncryptionSettings) -> JoseHeader {
        match settings {
            EncryptionSettings::Jws { key } => JoseHeader::new()
                .with("alg", ALG_EDDSA)
                .with("typ", TYP_JWT)
                .with("kid", key.key_id()),
            EncryptionSettings::Jwe { key } => JoseHeader::new()
                .with("alg", ALG_DIR)
                .with("enc", ENC_A256GCM)
                .with("typ", TYP_JWT)
                .with("kid", key.key_id()),
            EncryptionSettings::Unsecured => {
                JoseHeader::new().with("alg", ALG_NONE).with("typ", TYP_JWT)
            }
        }
    }

    /// Serialize `jwt` in compact form, securing it with `settings`.
    #[instrument(skip_all, fields(kind = jwt.kind()))]
    pub fn create(&self, jwt: Jwt, settings: &EncryptionSettings) -> Result<String, TokenError> {
        match (jwt, settings) {
            (Jwt::Jws(jws), EncryptionSettings::Jws { key }) => {
                if jws.unprotected.as_ref().is_some_and(|h| !h.is_empty()) {
                    return Err(TokenError::UnsupportedSerialization(
                        "JWS unprotected header".to_string(),
                    ));
                }
                require_param(&jws.protected, "alg", ALG_EDDSA)?;

                let header_b64 = encode_header(&jws.protected)?;
                let payload_b64 = encode_segment(&jws.payload.to_bytes()?);
                let signing_input = format!("{}.{}", header_b64, payload_b64);
                let signature = crypto::sign(signing_input.as_bytes(), key)?;

                Ok(format!("{}.{}", signing_input, signature))
            }
            (Jwt::Jwe(jwe), EncryptionSettings::Jwe { key }) => {
                if jwe.shared_unprotected.as_ref().is_some_and(|h| !h.is_empty())
                    || jwe.per_recipient_unprotected.iter().any(|h| !h.is_empty())
                {
                    return Err(TokenError::UnsupportedSerialization(
                        "JWE unprotected header".to_string(),
                    ));
                }
                require_param(&jwe.protected, "alg", ALG_DIR)?;
                require_param(&jwe.protected, "enc", ENC_A256GCM)?;

                let header_b64 = encode_header(&jwe.protected)?;
                let sealed = crypto::seal(&jwe.payload.to_bytes()?, key, header_b64.as_bytes())?;

                Ok(format!(
                    "{}..{}.{}.{}",
                    header_b64,
                    encode_segment(&sealed.iv),
                    encode_segment(&sealed.ciphertext),
                    encode_segment(&sealed.tag)
                ))
            }
            (Jwt::Unsecured(unsecured), EncryptionSettings::Unsecured) => {
                require_param(&unsecured.header, "alg", ALG_NONE)?;

                let header_b64 = encode_header(&unsecured.header)?;
                let payload_b64 = encode_segment(&unsecured.payload.to_bytes()?);

                Ok(format!("{}.{}.", header_b64, payload_b64))
            }
            (jwt, settings) => Err(TokenError::UnsupportedSerialization(format!(
                "{} envelope with {} settings",
                jwt.kind(),
                settings.kind()
            ))),
        }
    }

    /// Parse, verify and decrypt a compact token.
    ///
    /// Unsecured tokens are always rejected.
    #[instrument(skip_all)]
    pub fn read(&self, token: &str) -> Result<Jwt, TokenError> {
        let compact = split_compact(token)?;
        let protected = JoseHeader::from(compact.header()?);

        let alg = protected
            .algorithm()
            .ok_or_else(|| TokenError::Malformed("missing alg header".to_string()))?;
        if alg.eq_ignore_ascii_case(ALG_NONE) {
            tracing::debug!(target: "jwt.manager", "Token rejected: unsecured token");
            return Err(TokenError::UnsupportedAlgorithm(alg.to_string()));
        }

        match compact.form() {
            CompactForm::Jws => self.read_jws(compact.segments(), protected),
            CompactForm::Jwe => self.read_jwe(compact.segments(), protected),
        }
    }

    fn read_jws(&self, segments: &[&str], protected: JoseHeader) -> Result<Jwt, TokenError> {
        let [header_b64, payload_b64, signature] = segments else {
            return Err(TokenError::Malformed("expected 3 segments".to_string()));
        };

        require_param(&protected, "alg", ALG_EDDSA)?;
        require_kid(&protected, self.keys.signing.key_id())?;

        let signing_input = format!("{}.{}", header_b64, payload_b64);
        crypto::verify(signature, signing_input.as_bytes(), &self.keys.signing)?;

        let payload = Payload::from_bytes(decode_segment(payload_b64)?);

        Ok(Jwt::Jws(Jws {
            protected,
            payload,
            unprotected: None,
        }))
    }

    fn read_jwe(&self, segments: &[&str], protected: JoseHeader) -> Result<Jwt, TokenError> {
        let [header_b64, encrypted_key, iv, ciphertext, tag] = segments else {
            return Err(TokenError::Malformed("expected 5 segments".to_string()));
        };

        require_param(&protected, "alg", ALG_DIR)?;
        require_param(&protected, "enc", ENC_A256GCM)?;

        let Some(key) = &self.keys.content else {
            tracing::debug!(target: "jwt.manager", "Token rejected: no content key configured");
            return Err(TokenError::UnknownKey);
        };
        require_kid(&protected, key.key_id())?;

        if !encrypted_key.is_empty() {
            return Err(TokenError::Malformed(
                "direct encryption has no encrypted key".to_string(),
            ));
        }

        let sealed = SealedPayload {
            iv: decode_segment(iv)?,
            ciphertext: decode_segment(ciphertext)?,
            tag: decode_segment(tag)?,
        };
        let plaintext = crypto::open(&sealed, key, header_b64.as_bytes())?;

        Ok(Jwt::Jwe(Jwe {
            protected,
            shared_unprotected: None,
            per_recipient_unprotected: Vec::new(),
            payload: Payload::from_bytes(plaintext),
        }))
    }
}

fn encode_header(header: &JoseHeader) -> Result<String, TokenError> {
    let bytes = serde_json::to_vec(header)
        .map_err(|e| TokenError::Malformed(format!("header serialization: {}", e)))?;
    Ok(encode_segment(&bytes))
}

fn require_param(header: &JoseHeader, name: &str, expected: &str) -> Result<(), TokenError> {
    match header.get_str(name) {
        Some(value) if value == expected => Ok(()),
        other => {
            tracing::debug!(
                target: "jwt.manager",
                param = name,
                expected = expected,
                actual = ?other,
                "Token rejected: unexpected header parameter"
            );
            Err(TokenError::UnsupportedAlgorithm(
                other.unwrap_or("missing").to_string(),
            ))
        }
    }
}

fn require_kid(header: &JoseHeader, expected: &str) -> Result<(), TokenError> {
    match header.key_id() {
        Some(kid) if kid == expected => Ok(()),
        other => {
            tracing::debug!(
                target: "jwt.manager",
                kid = ?other,
                "Token rejected: kid does not match a configured key"
            );
            Err(TokenError::UnknownKey)
        }
    }
}
