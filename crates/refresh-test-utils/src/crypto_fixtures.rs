//! Deterministic cryptographic fixtures for testing
//!
//! Provides reproducible Ed25519 keypairs and content keys.
//! All fixtures are deterministic based on seed values.

use base64::engine::general_purpose;
use base64::Engine;
use refresh_service::crypto::{ContentKey, KeyRing, SigningKey};
use ring::signature::{Ed25519KeyPair, KeyPair};
use thiserror::Error;

/// `kid` of the fixture signing key.
pub const TEST_SIGNING_KEY_ID: &str = "test-sig-01";

/// `kid` of the fixture content key.
pub const TEST_CONTENT_KEY_ID: &str = "test-enc-01";

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

/// Whether tokens are signed only (JWS) or encrypted (JWE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    Signed,
    Encrypted,
}

/// Generate a deterministic Ed25519 signing key for testing.
///
/// # Returns
/// * `Ok((public_key_base64, private_key_pkcs8))`
pub fn test_signing_key(seed: u8) -> Result<(String, Vec<u8>), FixtureError> {
    let mut seed_bytes = [0u8; 32];
    seed_bytes[0] = seed;
    for (i, byte) in seed_bytes.iter_mut().enumerate().skip(1) {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
    }

    let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test keypair: {:?}", e)))?;

    let public_key_base64 = general_purpose::STANDARD.encode(key_pair.public_key().as_ref());

    Ok((public_key_base64, build_pkcs8_from_seed(&seed_bytes)))
}

/// Build a PKCS#8 v1 document (RFC 5208) around an Ed25519 seed.
fn build_pkcs8_from_seed(seed: &[u8; 32]) -> Vec<u8> {
    let mut pkcs8 = Vec::with_capacity(48);

    // SEQUENCE, 46 bytes
    pkcs8.extend_from_slice(&[0x30, 0x2e]);
    // version INTEGER 0
    pkcs8.extend_from_slice(&[0x02, 0x01, 0x00]);
    // AlgorithmIdentifier { OID 1.3.101.112 }
    pkcs8.extend_from_slice(&[0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70]);
    // privateKey OCTET STRING { OCTET STRING seed }
    pkcs8.extend_from_slice(&[0x04, 0x22, 0x04, 0x20]);
    pkcs8.extend_from_slice(seed);

    pkcs8
}

/// Deterministic 32-byte AES-256-GCM content key.
pub fn test_content_key() -> Vec<u8> {
    (0u8..32).collect()
}

/// Key ring built from the fixtures, with a content key in `Encrypted` mode.
pub fn test_key_ring(seed: u8, mode: KeyMode) -> Result<KeyRing, FixtureError> {
    let (_, pkcs8) = test_signing_key(seed)?;
    let signing = SigningKey::from_pkcs8(TEST_SIGNING_KEY_ID, pkcs8)
        .map_err(|e| FixtureError::Crypto(e.to_string()))?;

    let content = match mode {
        KeyMode::Signed => None,
        KeyMode::Encrypted => Some(
            ContentKey::new(TEST_CONTENT_KEY_ID, test_content_key())
                .map_err(|e| FixtureError::Crypto(e.to_string()))?,
        ),
    };

    Ok(KeyRing::new(signing, content))
}
