//! Observability for the refresh service.
//!
//! Instrumentation uses `#[instrument(skip_all)]` with explicit fields.
//! Field handling:
//! - **SAFE**: logged as-is (envelope kind, user type, error category)
//! - **HASHED**: SHA-256 prefix for correlation (user id)
//! - **NEVER**: bearer tokens, key material, claim sets

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// One-way and truncated: enough to follow one user across log lines, not
/// meant to protect secrets.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_for_correlation_is_stable_and_short() {
        let first = hash_for_correlation("42");
        assert_eq!(first, hash_for_correlation("42"));
        assert_eq!(first.len(), 8);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_for_correlation_differs_per_input() {
        assert_ne!(hash_for_correlation("1"), hash_for_correlation("2"));
    }
}
