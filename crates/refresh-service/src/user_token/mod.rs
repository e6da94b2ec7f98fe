//! User-token collaborators: reading, validating, revoking and issuing.

pub mod context;
pub mod issuer;
pub mod parameters;
pub mod reader;
pub mod revocation;
pub mod validator;

pub use context::{JwtUserContext, OpaqueUserContext, UserContext, UserToken, UserTokenData, UserType};
pub use issuer::{JwtUserTokenIssuer, TokenTtl, UserTokenIssuer};
pub use parameters::{UserTokenParameters, UserTokenParametersFactory};
pub use reader::{JwtUserTokenReader, UserTokenReader};
pub use revocation::{InMemoryRevocationRegistry, RevokedTokenRegistry};
pub use validator::{JwtUserTokenValidator, UserTokenValidator};
