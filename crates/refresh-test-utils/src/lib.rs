//! # Refresh Test Utilities
//!
//! Shared test utilities for the refresh service.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed keys for reproducible tests)
//! - `TestTokenBuilder` for minting admin/customer tokens with chosen times
//! - `TestRefreshServer` for end-to-end HTTP tests
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use refresh_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestRefreshServer::spawn(KeyMode::Signed).await?;
//!
//!     let token = TestTokenBuilder::admin()
//!         .issued_at(1_700_000_000)
//!         .build(server.manager())?;
//!
//!     let refreshed = server.refresh(&token).await?;
//!     refreshed.assert_valid_jws();
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
