//! Admin token refresh service.
//!
//! Re-issues admin JWTs with a later expiry while keeping the original
//! issued-at time, so revocation by issue time keeps working across
//! refreshes.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Key material, EdDSA signing, AES-256-GCM encryption
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `jwt` - JOSE envelope model and compact serialization
//! - `observability` - Metrics and log correlation
//! - `routes` - HTTP router
//! - `services` - Refresh orchestration and the issued-at override hook
//! - `user_token` - Reading, validating, revoking and issuing user tokens

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod jwt;
pub mod observability;
pub mod routes;
pub mod services;
pub mod user_token;
