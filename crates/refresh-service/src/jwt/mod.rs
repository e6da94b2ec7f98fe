//! JOSE token model and compact serialization.

pub mod claims;
pub mod envelope;
pub mod header;
pub mod hook;
pub mod manager;

pub use claims::{Claim, ClaimSet, IssuedAt, IssuedAtFactory};
pub use envelope::{EncryptionSettings, Jwe, Jws, Jwt, Payload, Unsecured};
pub use header::JoseHeader;
pub use hook::BeforeCreateHook;
pub use manager::JwtManager;
