//! Custom test assertions for expressive tests
//!
//! Structural checks read the compact serialization directly; claim checks
//! go through a `JwtManager` so they work for encrypted tokens too.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use refresh_service::jwt::{ClaimSet, JwtManager};
use serde_json::Value;

fn decode_header(token: &str) -> serde_json::Map<String, Value> {
    let header_b64 = token.split('.').next().expect("Token has no header segment");
    let bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .expect("Failed to base64 decode token header");
    serde_json::from_slice(&bytes).expect("Failed to parse token header JSON")
}

/// Read and verify the claim set of a token.
pub fn read_claims(token: &str, manager: &JwtManager) -> ClaimSet {
    let jwt = manager.read(token).expect("Token should read with the test keys");
    jwt.claims().cloned().expect("Token payload should be a claim set")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jws()
///     .assert_signed_by("test-sig-01")
///     .assert_issued_at(&manager, 1_700_000_000);
/// ```
pub trait TokenAssertions {
    /// Assert a compact JWS: 3 segments, `alg: EdDSA`, `typ: JWT`
    fn assert_valid_jws(&self) -> &Self;

    /// Assert a compact JWE: 5 segments, empty encrypted key, `alg: dir`,
    /// `enc: A256GCM`
    fn assert_valid_jwe(&self) -> &Self;

    /// Assert the header `kid`
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert the `iat` claim
    fn assert_issued_at(&self, manager: &JwtManager, timestamp: i64) -> &Self;

    /// Assert the `exp` claim is strictly after `timestamp`
    fn assert_expires_after(&self, manager: &JwtManager, timestamp: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jws(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWS must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = decode_header(self);
        assert_eq!(header.get("alg"), Some(&Value::from("EdDSA")), "Expected EdDSA algorithm");
        assert_eq!(header.get("typ"), Some(&Value::from("JWT")), "Expected JWT type");

        let payload = URL_SAFE_NO_PAD.decode(parts[1]);
        assert!(
            payload.is_ok(),
            "Failed to base64 decode JWS payload: {:?}",
            payload.err()
        );

        self
    }

    fn assert_valid_jwe(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            5,
            "JWE must have 5 parts (header.key.iv.ciphertext.tag), got {}",
            parts.len()
        );
        assert!(parts[1].is_empty(), "Direct encryption must have an empty key segment");

        let header = decode_header(self);
        assert_eq!(header.get("alg"), Some(&Value::from("dir")), "Expected dir algorithm");
        assert_eq!(header.get("enc"), Some(&Value::from("A256GCM")), "Expected A256GCM encryption");

        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = decode_header(self);
        let kid = header.get("kid").and_then(Value::as_str);

        assert_eq!(kid, Some(key_id), "Expected key_id '{}', got {:?}", key_id, kid);

        self
    }

    fn assert_issued_at(&self, manager: &JwtManager, timestamp: i64) -> &Self {
        let claims = read_claims(self, manager);
        let iat = claims.get("iat").and_then(Value::as_i64);

        assert_eq!(iat, Some(timestamp), "Expected iat {}, got {:?}", timestamp, iat);

        self
    }

    fn assert_expires_after(&self, manager: &JwtManager, timestamp: i64) -> &Self {
        let claims = read_claims(self, manager);
        let exp = claims
            .get("exp")
            .and_then(Value::as_i64)
            .expect("Token should carry an integer exp claim");

        assert!(
            exp > timestamp,
            "Expected exp after {}, got {}",
            timestamp,
            exp
        );

        self
    }
}
