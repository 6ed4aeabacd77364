//! 应用服务层

pub mod account;
pub mod otp;
pub mod password;
pub mod rate_limiter;

pub use account::{AccountService, Registration};
pub use password::PasswordHasher;
pub use rate_limiter::{RateLimitDecision, RateLimiter};
