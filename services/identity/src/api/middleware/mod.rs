pub mod auth;
pub mod rate_limit;

pub use auth::{AuthGuard, AuthToken, CurrentUser, auth_middleware};
pub use rate_limit::rate_limit_middleware;
