//! Redis 短时键值存储实现

use async_trait::async_trait;
use gatehouse_errors::{AppError, AppResult};
use gatehouse_ports::EphemeralStore;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::time::Duration;

/// Redis 存储
///
/// `ConnectionManager` 内部自带重连，克隆开销很小，
/// 每次操作克隆一份以获得可变句柄。
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl EphemeralStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| AppError::store_unavailable(format!("Redis get failed: {}", e)))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.set_ex(key, value, ttl.as_secs())
            .await
            .map_err(|e| AppError::store_unavailable(format!("Redis set failed: {}", e)))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del(key)
            .await
            .map_err(|e| AppError::store_unavailable(format!("Redis delete failed: {}", e)))
    }

    async fn incr_with_ttl(&self, key: &str, ttl_seconds: u64) -> AppResult<i64> {
        let mut conn = self.conn.clone();

        // INCR 与首次 EXPIRE 必须是一个原子单元，
        // 分开执行时竞态会留下永不过期的计数器
        let script = Script::new(
            r"
            local current = redis.call('INCR', KEYS[1])
            if current == 1 then
                redis.call('EXPIRE', KEYS[1], ARGV[1])
            end
            return current
            ",
        );

        script
            .key(key)
            .arg(ttl_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::store_unavailable(format!("Redis incr_with_ttl failed: {}", e)))
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<i64>> {
        let mut conn = self.conn.clone();
        let ttl: i64 = conn
            .ttl(key)
            .await
            .map_err(|e| AppError::store_unavailable(format!("Redis ttl failed: {}", e)))?;

        // -2 是键不存在，-1 是没设过期，都归一成 None
        match ttl {
            t if t < 0 => Ok(None),
            t => Ok(Some(t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_connection_manager;

    async fn store() -> RedisStore {
        let conn = create_connection_manager("redis://127.0.0.1:6379")
            .await
            .unwrap();
        RedisStore::new(conn)
    }

    #[tokio::test]
    #[ignore] // 需要 Redis 实例
    async fn test_set_get_delete() {
        let store = store().await;

        store
            .set("test:store:basic", "hello", Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(
            store.get("test:store:basic").await.unwrap(),
            Some("hello".to_string())
        );

        store.delete("test:store:basic").await.unwrap();
        assert_eq!(store.get("test:store:basic").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // 需要 Redis 实例
    async fn test_incr_with_ttl_sets_expiry_once() {
        let store = store().await;
        store.delete("test:store:counter").await.unwrap();

        assert_eq!(store.incr_with_ttl("test:store:counter", 60).await.unwrap(), 1);
        assert_eq!(store.incr_with_ttl("test:store:counter", 60).await.unwrap(), 2);

        let ttl = store.ttl("test:store:counter").await.unwrap().unwrap();
        assert!(ttl > 0 && ttl <= 60);

        store.delete("test:store:counter").await.unwrap();
    }

    #[tokio::test]
    #[ignore] // 需要 Redis 实例
    async fn test_ttl_missing_key_is_none() {
        let store = store().await;
        assert_eq!(store.ttl("test:store:missing").await.unwrap(), None);
    }
}
