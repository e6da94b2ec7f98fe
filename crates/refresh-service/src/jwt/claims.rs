//! Claims and claim sets carried in a token payload.

use crate::errors::ClaimError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ISSUED_AT: &str = "iat";
pub const EXPIRATION: &str = "exp";
pub const JWT_ID: &str = "jti";
pub const USER_ID: &str = "uid";
pub const USER_TYPE_ID: &str = "utypid";

/// A single named claim.
///
/// `duplicate_allowed` marks a claim that may replace an existing claim of
/// the same name instead of being rejected as a duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    name: String,
    value: Value,
    duplicate_allowed: bool,
}

impl Claim {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            duplicate_allowed: false,
        }
    }

    pub fn duplicate_allowed(mut self, allowed: bool) -> Self {
        self.duplicate_allowed = allowed;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_duplicate_allowed(&self) -> bool {
        self.duplicate_allowed
    }
}

/// The `iat` claim. Serialized as NumericDate (whole seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedAt {
    value: DateTime<Utc>,
    duplicate_allowed: bool,
}

impl IssuedAt {
    pub fn value(&self) -> DateTime<Utc> {
        self.value
    }

    pub fn is_duplicate_allowed(&self) -> bool {
        self.duplicate_allowed
    }
}

impl From<IssuedAt> for Claim {
    fn from(iat: IssuedAt) -> Self {
        Claim::new(ISSUED_AT, iat.value.timestamp()).duplicate_allowed(iat.duplicate_allowed)
    }
}

/// Builds `iat` claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuedAtFactory;

impl IssuedAtFactory {
    pub fn create(&self, value: DateTime<Utc>, duplicate_allowed: bool) -> IssuedAt {
        IssuedAt {
            value,
            duplicate_allowed,
        }
    }
}

/// Insertion-ordered claim set with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim.
    ///
    /// An existing claim with the same name is replaced in place when the new
    /// claim allows duplicates; otherwise the insert fails.
    pub fn insert(&mut self, claim: impl Into<Claim>) -> Result<(), ClaimError> {
        let claim = claim.into();
        if self.0.contains_key(&claim.name) && !claim.duplicate_allowed {
            return Err(ClaimError::Duplicate(claim.name));
        }
        self.0.insert(claim.name, claim.value);
        Ok(())
    }

    /// Insert or overwrite a claim regardless of its duplicate flag.
    pub fn set(&mut self, claim: impl Into<Claim>) {
        let claim = claim.into();
        self.0.insert(claim.name, claim.value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.numeric_date(ISSUED_AT)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.numeric_date(EXPIRATION)
    }

    fn numeric_date(&self, name: &str) -> Option<DateTime<Utc>> {
        let seconds = self.0.get(name)?.as_i64()?;
        Utc.timestamp_opt(seconds, 0).single()
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
