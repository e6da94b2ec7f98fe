//! Observability configuration shared by the token refresher binaries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default `tracing` filter when `LOG_LEVEL` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level or full `EnvFilter` directive (trace, debug, info, warn, error)
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// Read `LOG_LEVEL` and `LOG_FORMAT` (`json` or `text`) from a variable map.
    ///
    /// Unknown formats fall back to text output.
    #[must_use]
    pub fn from_vars<S: std::hash::BuildHasher>(vars: &HashMap<String, String, S>) -> Self {
        let log_level = vars
            .get("LOG_LEVEL")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_string();

        let json_logs = vars
            .get("LOG_FORMAT")
            .is_some_and(|v| v.eq_ignore_ascii_case("json"));

        Self {
            log_level,
            json_logs,
        }
    }
}
