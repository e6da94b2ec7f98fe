pub mod issued_at_override;
pub mod refresh_service;

pub use issued_at_override::IssuedAtOverride;
pub use refresh_service::{JwtRefreshService, RequestContext};
