//! Key material and cryptographic primitives for JWS and JWE tokens.
//!
//! - Ed25519 (EdDSA) signing keys, stored as PKCS#8 inside `SecretBox`
//! - JWS signatures over the compact signing input via `jsonwebtoken::crypto`
//! - AES-256-GCM content encryption with a detached 128-bit tag via `ring::aead`

use crate::errors::TokenError;
use base64::{engine::general_purpose, Engine as _};
use common::secret::{ExposeSecret, SecretBox};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use ring::{
    aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN},
    rand::{SecureRandom, SystemRandom},
    signature::{Ed25519KeyPair, KeyPair},
};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Length of an AES-256-GCM content key in bytes.
pub const CONTENT_KEY_LEN: usize = 32;

/// Length of an AES-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Ed25519 signing key with its key ID.
///
/// Debug is manually implemented to redact the private key.
pub struct SigningKey {
    key_id: String,
    private_key_pkcs8: SecretBox<Vec<u8>>,
    public_key: Vec<u8>,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("private_key_pkcs8", &"[REDACTED]")
            .field("public_key", &general_purpose::STANDARD.encode(&self.public_key))
            .finish()
    }
}

impl SigningKey {
    /// Load a signing key from PKCS#8 (v1 or v2) DER bytes.
    #[instrument(skip_all)]
    pub fn from_pkcs8(key_id: impl Into<String>, pkcs8: Vec<u8>) -> Result<Self, TokenError> {
        let key_pair = Ed25519KeyPair::from_pkcs8_maybe_unchecked(&pkcs8)
            .map_err(|e| TokenError::Crypto(format!("Invalid private key format: {}", e)))?;
        let public_key = key_pair.public_key().as_ref().to_vec();

        Ok(Self {
            key_id: key_id.into(),
            private_key_pkcs8: SecretBox::new(Box::new(pkcs8)),
            public_key,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Raw 32-byte Ed25519 public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

/// AES-256-GCM content key for direct (`alg: dir`) JWE encryption.
pub struct ContentKey {
    key_id: String,
    key: SecretBox<Vec<u8>>,
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentKey")
            .field("key_id", &self.key_id)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl ContentKey {
    /// Wrap raw key bytes, which must be exactly 32 bytes long.
    pub fn new(key_id: impl Into<String>, key: Vec<u8>) -> Result<Self, TokenError> {
        if key.len() != CONTENT_KEY_LEN {
            return Err(TokenError::Crypto(format!(
                "Invalid content key length: {} (expected {})",
                key.len(),
                CONTENT_KEY_LEN
            )));
        }

        Ok(Self {
            key_id: key_id.into(),
            key: SecretBox::new(Box::new(key)),
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

/// Keys shared by the token reader and the token issuer.
#[derive(Debug, Clone)]
pub struct KeyRing {
    pub signing: Arc<SigningKey>,
    pub content: Option<Arc<ContentKey>>,
}

impl KeyRing {
    pub fn new(signing: SigningKey, content: Option<ContentKey>) -> Self {
        Self {
            signing: Arc::new(signing),
            content: content.map(Arc::new),
        }
    }
}

/// AES-256-GCM output with the tag kept separate, as JWE compact requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub iv: Vec<u8>,         // 96-bit (12 bytes)
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,        // 128-bit (16 bytes)
}

/// Generate a fresh Ed25519 signing key using CSPRNG.
#[instrument(skip_all)]
pub fn generate_signing_key(key_id: &str) -> Result<SigningKey, TokenError> {
    let rng = SystemRandom::new();

    let pkcs8_bytes = Ed25519KeyPair::generate_pkcs8(&rng)
        .map_err(|e| TokenError::Crypto(format!("Keypair generation failed: {}", e)))?;

    SigningKey::from_pkcs8(key_id, pkcs8_bytes.as_ref().to_vec())
}

/// Generate a fresh random content key.
#[instrument(skip_all)]
pub fn generate_content_key(key_id: &str) -> Result<ContentKey, TokenError> {
    ContentKey::new(key_id, generate_random_bytes(CONTENT_KEY_LEN)?)
}

/// Sign a compact JWS signing input with EdDSA.
///
/// Returns the base64url-encoded signature segment.
#[instrument(skip_all)]
pub fn sign(signing_input: &[u8], key: &SigningKey) -> Result<String, TokenError> {
    let encoding_key = EncodingKey::from_ed_der(key.private_key_pkcs8.expose_secret());

    jsonwebtoken::crypto::sign(signing_input, &encoding_key, Algorithm::EdDSA)
        .map_err(|e| TokenError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify a base64url EdDSA signature over a compact JWS signing input.
#[instrument(skip_all)]
pub fn verify(signature: &str, signing_input: &[u8], key: &SigningKey) -> Result<(), TokenError> {
    let decoding_key = DecodingKey::from_ed_der(key.public_key());

    match jsonwebtoken::crypto::verify(signature, signing_input, &decoding_key, Algorithm::EdDSA) {
        Ok(true) => Ok(()),
        Ok(false) => Err(TokenError::BadSignature),
        Err(e) => {
            tracing::debug!(target: "crypto", error = %e, "Signature verification errored");
            Err(TokenError::BadSignature)
        }
    }
}

/// Encrypt a payload with AES-256-GCM under a random 96-bit IV.
#[instrument(skip_all)]
pub fn seal(plaintext: &[u8], key: &ContentKey, aad: &[u8]) -> Result<SealedPayload, TokenError> {
    let rng = SystemRandom::new();

    let mut iv = [0u8; NONCE_LEN];
    rng.fill(&mut iv)
        .map_err(|e| TokenError::Crypto(format!("Nonce generation failed: {}", e)))?;

    let unbound_key = UnboundKey::new(&AES_256_GCM, key.key.expose_secret())
        .map_err(|e| TokenError::Crypto(format!("Cipher key creation failed: {}", e)))?;
    let sealing_key = LessSafeKey::new(unbound_key);

    let mut in_out = plaintext.to_vec();
    let tag = sealing_key
        .seal_in_place_separate_tag(Nonce::assume_unique_for_key(iv), Aad::from(aad), &mut in_out)
        .map_err(|e| TokenError::Crypto(format!("Encryption operation failed: {}", e)))?;

    Ok(SealedPayload {
        iv: iv.to_vec(),
        ciphertext: in_out,
        tag: tag.as_ref().to_vec(),
    })
}

/// Decrypt and authenticate an AES-256-GCM payload.
///
/// Any authentication failure is reported as `TokenError::Decryption`.
#[instrument(skip_all)]
pub fn open(sealed: &SealedPayload, key: &ContentKey, aad: &[u8]) -> Result<Vec<u8>, TokenError> {
    let iv: [u8; NONCE_LEN] = sealed.iv.as_slice().try_into().map_err(|_| {
        tracing::debug!(target: "crypto", iv_len = sealed.iv.len(), "Invalid IV length");
        TokenError::Decryption
    })?;

    if sealed.tag.len() != TAG_LEN {
        tracing::debug!(target: "crypto", tag_len = sealed.tag.len(), "Invalid tag length");
        return Err(TokenError::Decryption);
    }

    let unbound_key = UnboundKey::new(&AES_256_GCM, key.key.expose_secret())
        .map_err(|e| TokenError::Crypto(format!("Cipher key creation failed: {}", e)))?;
    let opening_key = LessSafeKey::new(unbound_key);

    let mut in_out = sealed.ciphertext.clone();
    in_out.extend_from_slice(&sealed.tag);

    let plaintext = opening_key
        .open_in_place(Nonce::assume_unique_for_key(iv), Aad::from(aad), &mut in_out)
        .map_err(|_| TokenError::Decryption)?;

    Ok(plaintext.to_vec())
}

/// Generate cryptographically secure random bytes
pub fn generate_random_bytes(len: usize) -> Result<Vec<u8>, TokenError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|e| TokenError::Crypto(format!("Random bytes generation failed: {}", e)))?;
    Ok(bytes)
}
