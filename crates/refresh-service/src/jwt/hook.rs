use super::envelope::{EncryptionSettings, Jwt};
use crate::errors::InterceptorError;

/// Runs right before a token envelope is signed or encrypted.
///
/// Hooks receive the envelope and its settings by value and return the pair
/// the issuer should serialize. Hooks are passed per issuance call; issuers
/// keep no hook state of their own.
pub trait BeforeCreateHook: Send + Sync {
    fn before_create(
        &self,
        jwt: Jwt,
        settings: EncryptionSettings,
    ) -> Result<(Jwt, EncryptionSettings), InterceptorError>;
}
