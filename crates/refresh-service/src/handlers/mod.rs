pub mod metrics;
pub mod refresh_handler;

pub use metrics::metrics_handler;
pub use refresh_handler::{health_check, refresh_admin_token, AppState};
