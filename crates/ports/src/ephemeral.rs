//! 短时键值存储 trait 定义
//!
//! 承载验证码、令牌黑名单和限流计数器三类带 TTL 的条目。
//! 实现必须保证 set 带 TTL 原子生效，incr_with_ttl 的自增与
//! 首次过期设置作为单个操作执行

use async_trait::async_trait;
use gatehouse_errors::AppResult;
use std::time::Duration;

/// 短时键值存储 trait
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// 获取值，不存在或已过期返回 None
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 写入值并设置过期时间，已存在的键被覆盖且 TTL 重置
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// 删除键
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 原子自增，键首次创建时设置过期时间，返回自增后的值
    async fn incr_with_ttl(&self, key: &str, ttl_seconds: u64) -> AppResult<i64>;

    /// 剩余存活秒数，键不存在或无过期时间返回 None
    async fn ttl(&self, key: &str) -> AppResult<Option<i64>>;
}
