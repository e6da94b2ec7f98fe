use chrono::{DateTime, Utc};

/// Per-issuance options for a new user token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserTokenParameters {
    issued_at: DateTime<Utc>,
}

impl UserTokenParameters {
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }
}

/// Builds default parameters: issued now.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserTokenParametersFactory;

impl UserTokenParametersFactory {
    pub fn create(&self) -> UserTokenParameters {
        UserTokenParameters {
            issued_at: Utc::now(),
        }
    }
}
