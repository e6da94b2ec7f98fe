//! Revocation by issue time.
//!
//! Revoking a user records a cutoff; every token of that user whose `iat` is
//! at or before the cutoff is revoked. Refreshed tokens keep the original
//! `iat`, so revoking a session also revokes all of its refreshes.

use super::context::UserType;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

pub trait RevokedTokenRegistry: Send + Sync {
    /// Cutoff for the given user, if any tokens were revoked.
    fn revoked_before(&self, user_type: UserType, user_id: u64) -> Option<DateTime<Utc>>;

    fn is_revoked(&self, user_type: UserType, user_id: u64, issued: DateTime<Utc>) -> bool {
        self.revoked_before(user_type, user_id)
            .is_some_and(|cutoff| issued <= cutoff)
    }
}

/// Process-local registry.
#[derive(Debug, Default)]
pub struct InMemoryRevocationRegistry {
    cutoffs: RwLock<HashMap<(UserType, u64), DateTime<Utc>>>,
}

impl InMemoryRevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke every token of the user issued at or before `at`.
    ///
    /// A later cutoff always wins over an earlier one.
    pub fn revoke(&self, user_type: UserType, user_id: u64, at: DateTime<Utc>) {
        let mut cutoffs = self.cutoffs.write().unwrap_or_else(PoisonError::into_inner);
        let cutoff = cutoffs.entry((user_type, user_id)).or_insert(at);
        if at > *cutoff {
            *cutoff = at;
        }
        tracing::debug!(target: "user_token.revocation", user_type = %user_type, "Tokens revoked");
    }
}

impl RevokedTokenRegistry for InMemoryRevocationRegistry {
    fn revoked_before(&self, user_type: UserType, user_id: u64) -> Option<DateTime<Utc>> {
        self.cutoffs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(user_type, user_id))
            .copied()
    }
}
