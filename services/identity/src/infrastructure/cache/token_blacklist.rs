//! 令牌黑名单
//!
//! 条目 TTL 与令牌最长有效期一致：令牌自然过期后，
//! 黑名单里也不再需要对应记录。

use gatehouse_errors::AppResult;
use gatehouse_ports::EphemeralStore;
use std::sync::Arc;
use std::time::Duration;

const REVOKED_MARKER: &str = "invalid";

/// 令牌黑名单
#[derive(Clone)]
pub struct TokenBlacklist {
    store: Arc<dyn EphemeralStore>,
    ttl: Duration,
}

impl TokenBlacklist {
    pub fn new(store: Arc<dyn EphemeralStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn key(token: &str) -> String {
        format!("blacklist:{}", token)
    }

    /// 在自然过期前显式作废令牌
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        self.store
            .set(&Self::key(token), REVOKED_MARKER, self.ttl)
            .await
    }

    /// 令牌是否已被作废
    pub async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        Ok(self.store.get(&Self::key(token)).await?.is_some())
    }
}
