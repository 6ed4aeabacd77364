//! 应用状态

use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;

use gatehouse_auth_core::TokenService;

use crate::infrastructure::cache::TokenBlacklist;
use crate::services::{AccountService, RateLimiter};

/// 路由层共享状态
///
/// 全部字段为只读句柄，克隆开销小。
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub tokens: TokenService,
    pub blacklist: TokenBlacklist,
    pub rate_limiter: Arc<RateLimiter>,
    pub pool: PgPool,
    pub redis: ConnectionManager,
    pub app_name: String,
}
