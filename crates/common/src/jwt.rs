//! Compact JWT inspection shared by the token refresher crates.
//!
//! This module provides the pieces of JWT handling that do not need key
//! material:
//! - Size limits for DoS prevention
//! - Clock skew constants for iat validation
//! - Splitting compact JWS (3 segments) and JWE (5 segments) serializations
//! - Decoding the JOSE header
//! - iat validation logic
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Nothing here verifies a signature or decrypts a payload
//! - Generic error messages prevent information leakage
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{split_compact, validate_iat, DEFAULT_CLOCK_SKEW};
//!
//! let compact = split_compact(token)?;
//! let header = compact.header()?;
//!
//! // After signature verification or decryption, validate iat
//! validate_iat(claims.iat, DEFAULT_CLOCK_SKEW)?;
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// JWTs larger than this are rejected BEFORE any base64 decoding, parsing or
/// cryptographic operation.
///
/// # Rationale
///
/// - A signed admin token is ~300 bytes, the encrypted form ~400 bytes
/// - 8KB leaves room for extra claims and headers
/// - Checked BEFORE base64 decode and signature verification for efficiency
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default JWT clock skew tolerance (5 minutes per NIST SP 800-63B).
///
/// Tokens with `iat` more than this amount in the future are rejected.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Maximum allowed JWT clock skew tolerance (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Number of segments in a compact JWS (`header.payload.signature`).
pub const JWS_SEGMENTS: usize = 3;

/// Number of segments in a compact JWE
/// (`header.encrypted_key.iv.ciphertext.tag`).
pub const JWE_SEGMENTS: usize = 5;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while inspecting a compact JWT.
///
/// Note: Error messages are intentionally generic to prevent information leakage.
/// Detailed information is logged at debug level for troubleshooting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token format is invalid (not a compact JWS or JWE).
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

// =============================================================================
// Compact serialization
// =============================================================================

/// Which compact serialization a token uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactForm {
    /// `header.payload.signature`
    Jws,
    /// `header.encrypted_key.iv.ciphertext.tag`
    Jwe,
}

/// A size-checked compact token split into its base64url segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactToken<'a> {
    form: CompactForm,
    segments: Vec<&'a str>,
}

impl<'a> CompactToken<'a> {
    /// The serialization form, derived from the segment count.
    #[must_use]
    pub fn form(&self) -> CompactForm {
        self.form
    }

    /// All segments in wire order.
    #[must_use]
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// The encoded JOSE header (always the first segment).
    ///
    /// # Errors
    ///
    /// Returns `MalformedToken` if the segment list is empty, which
    /// `split_compact` never produces.
    pub fn header_segment(&self) -> Result<&'a str, JwtValidationError> {
        self.segments
            .first()
            .copied()
            .ok_or(JwtValidationError::MalformedToken)
    }

    /// Decode the JOSE header into its JSON object.
    ///
    /// # Errors
    ///
    /// Returns `MalformedToken` if the header is not base64url JSON object.
    pub fn header(&self) -> Result<Map<String, Value>, JwtValidationError> {
        let bytes = decode_segment(self.header_segment()?)?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => {
                tracing::debug!(target: "common.jwt", "JWT header is not a JSON object");
                Err(JwtValidationError::MalformedToken)
            }
            Err(e) => {
                tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
                Err(JwtValidationError::MalformedToken)
            }
        }
    }
}

/// Split a compact token into segments after checking its size.
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds `MAX_JWT_SIZE_BYTES`
/// - `MalformedToken` - segment count is neither 3 nor 5, or the header
///   segment is empty
pub fn split_compact(token: &str) -> Result<CompactToken<'_>, JwtValidationError> {
    // Check token size first (DoS prevention)
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let segments: Vec<&str> = token.split('.').collect();
    let form = match segments.len() {
        JWS_SEGMENTS => CompactForm::Jws,
        JWE_SEGMENTS => CompactForm::Jwe,
        other => {
            tracing::debug!(
                target: "common.jwt",
                parts = other,
                "Token rejected: invalid compact JWT format"
            );
            return Err(JwtValidationError::MalformedToken);
        }
    };

    if segments.first().map_or(true, |s| s.is_empty()) {
        tracing::debug!(target: "common.jwt", "Token rejected: empty header segment");
        return Err(JwtValidationError::MalformedToken);
    }

    Ok(CompactToken { form, segments })
}

/// Base64url-decode (no padding) a single compact segment.
///
/// # Errors
///
/// Returns `MalformedToken` if the segment is not valid base64url.
pub fn decode_segment(segment: &str) -> Result<Vec<u8>, JwtValidationError> {
    URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT segment base64");
        JwtValidationError::MalformedToken
    })
}

/// Base64url-encode (no padding) bytes into a compact segment.
#[must_use]
pub fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
// Functions
// =============================================================================

/// Validate the `iat` (issued-at) claim with clock skew tolerance.
///
/// Rejects tokens with `iat` too far in the future, which could indicate
/// token pre-generation or clock problems. Old `iat` values are accepted:
/// a refreshed token deliberately keeps the issue time of the original login.
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` if the iat timestamp is more than
/// `clock_skew` in the future.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), JwtValidationError> {
    let now = chrono::Utc::now().timestamp();
    validate_iat_at(iat, clock_skew, now)
}

/// Deterministic `iat` validation against an explicit `now` timestamp.
///
/// Prefer [`validate_iat`] in production code. This variant exists so that
/// boundary conditions can be unit-tested without wall-clock dependence.
pub(crate) fn validate_iat_at(
    iat: i64,
    clock_skew: Duration,
    now: i64,
) -> Result<(), JwtValidationError> {
    let clock_skew_secs = i64::try_from(clock_skew.as_secs()).unwrap_or(i64::MAX);
    let max_iat = now.saturating_add(clock_skew_secs);

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            clock_skew_secs = clock_skew_secs,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::cast_possible_wrap)]
mod tests {
    use super::*;

    fn jws_with_header(header: &str) -> String {
        format!("{}.payload.signature", URL_SAFE_NO_PAD.encode(header))
    }

    // -------------------------------------------------------------------------
    // Constants Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_max_jwt_size_is_8kb() {
        assert_eq!(MAX_JWT_SIZE_BYTES, 8192);
    }

    #[test]
    fn test_default_clock_skew_is_5_minutes() {
        assert_eq!(DEFAULT_CLOCK_SKEW, Duration::from_secs(300));
    }

    #[test]
    fn test_max_clock_skew_is_10_minutes() {
        assert_eq!(MAX_CLOCK_SKEW, Duration::from_secs(600));
    }

    // -------------------------------------------------------------------------
    // split_compact Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_split_compact_jws() {
        let compact = split_compact("aGVhZGVy.cGF5bG9hZA.c2ln").unwrap();
        assert_eq!(compact.form(), CompactForm::Jws);
        assert_eq!(compact.segments().len(), 3);
        assert_eq!(compact.header_segment().unwrap(), "aGVhZGVy");
    }

    #[test]
    fn test_split_compact_jwe_allows_empty_encrypted_key() {
        // Direct encryption leaves the encrypted key segment empty
        let compact = split_compact("aGVhZGVy..aXY.Y2lwaGVy.dGFn").unwrap();
        assert_eq!(compact.form(), CompactForm::Jwe);
        assert_eq!(compact.segments().get(1), Some(&""));
    }

    #[test]
    fn test_split_compact_rejects_other_segment_counts() {
        for token in ["abc", "a.b", "a.b.c.d", "a.b.c.d.e.f"] {
            assert!(
                matches!(split_compact(token), Err(JwtValidationError::MalformedToken)),
                "{token} should be rejected"
            );
        }
    }

    #[test]
    fn test_split_compact_rejects_empty_header() {
        let result = split_compact(".payload.signature");
        assert!(matches!(result, Err(JwtValidationError::MalformedToken)));
    }

    #[test]
    fn test_split_compact_oversized_token() {
        let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        let result = split_compact(&oversized);
        assert!(matches!(result, Err(JwtValidationError::TokenTooLarge)));
    }

    #[test]
    fn test_compact_header_rejects_non_object() {
        let token = jws_with_header("[1,2,3]");
        let result = split_compact(&token).unwrap().header();
        assert!(matches!(result, Err(JwtValidationError::MalformedToken)));
    }

    #[test]
    fn test_segment_encoding_is_unpadded_base64url() {
        let encoded = encode_segment(b"\xfb\xff");
        assert_eq!(encoded, "-_8");
        assert_eq!(decode_segment(&encoded).unwrap(), b"\xfb\xff");
    }

    #[test]
    fn test_split_compact_at_size_limit() {
        let header_b64 = URL_SAFE_NO_PAD.encode(r#"{"alg":"EdDSA","typ":"JWT","kid":"key"}"#);
        let remaining = MAX_JWT_SIZE_BYTES - header_b64.len() - 2; // -2 for two dots
        let payload_len = remaining / 2;
        let sig_len = remaining - payload_len;
        let token = format!(
            "{}.{}.{}",
            header_b64,
            "a".repeat(payload_len),
            "b".repeat(sig_len)
        );
        assert_eq!(token.len(), MAX_JWT_SIZE_BYTES);

        let header = split_compact(&token).unwrap().header().unwrap();
        assert_eq!(header.get("kid"), Some(&Value::from("key")));
    }

    // -------------------------------------------------------------------------
    // validate_iat Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_validate_iat_current_time() {
        let now = chrono::Utc::now().timestamp();
        assert!(validate_iat(now, DEFAULT_CLOCK_SKEW).is_ok());
    }

    #[test]
    fn test_validate_iat_long_past_time_is_accepted() {
        // Refreshed tokens keep the original login time, possibly days old
        let now = 1_700_000_000;
        assert!(validate_iat_at(now - 30 * 24 * 3600, DEFAULT_CLOCK_SKEW, now).is_ok());
    }

    #[test]
    fn test_validate_iat_at_clock_skew_boundary() {
        let now = 1_700_000_000;
        let skew = DEFAULT_CLOCK_SKEW.as_secs() as i64;
        assert!(validate_iat_at(now + skew, DEFAULT_CLOCK_SKEW, now).is_ok());
    }

    #[test]
    fn test_validate_iat_one_second_beyond_clock_skew() {
        let now = 1_700_000_000;
        let skew = DEFAULT_CLOCK_SKEW.as_secs() as i64;
        let result = validate_iat_at(now + skew + 1, DEFAULT_CLOCK_SKEW, now);
        assert!(matches!(result, Err(JwtValidationError::IatTooFarInFuture)));
    }

    #[test]
    fn test_validate_iat_far_future() {
        let now = chrono::Utc::now().timestamp();
        let result = validate_iat(now + 3600, DEFAULT_CLOCK_SKEW);
        assert!(matches!(result, Err(JwtValidationError::IatTooFarInFuture)));
    }

    #[test]
    fn test_validate_iat_with_huge_clock_skew_does_not_wrap() {
        let now = 1_700_000_000;
        let skew = Duration::from_secs(u64::MAX);

        assert!(validate_iat_at(now + 3600, skew, now).is_ok());
        assert!(validate_iat_at(i64::MAX, skew, now).is_ok());
    }

    #[test]
    fn test_error_messages_are_generic() {
        for err in [
            JwtValidationError::TokenTooLarge,
            JwtValidationError::MalformedToken,
            JwtValidationError::IatTooFarInFuture,
        ] {
            assert_eq!(err.to_string(), "The access token is invalid or expired");
        }
    }
}
