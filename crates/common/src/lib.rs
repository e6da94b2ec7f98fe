//! Common utilities and types shared across the token refresher crates.

#![warn(clippy::pedantic)]

/// Module for observability configuration
pub mod config;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for compact JWT inspection (size limits, headers, iat checks)
pub mod jwt;
