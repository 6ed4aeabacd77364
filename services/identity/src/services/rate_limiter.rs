//! 请求限流
//!
//! 按客户端地址计数的固定窗口限流。计数与首个过期时间的设置
//! 由存储端原子完成，窗口边界的突发是该算法已知且接受的近似。

use chrono::Utc;
use gatehouse_config::RateLimitConfig;
use gatehouse_errors::AppResult;
use gatehouse_ports::EphemeralStore;
use std::sync::Arc;

/// 单次限流判定结果
///
/// limit/remaining/reset_at 对应对外暴露的三个响应头。
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// 窗口重置时刻（Unix 秒）
    pub reset_at: i64,
}

/// 限流器
pub struct RateLimiter {
    store: Arc<dyn EphemeralStore>,
    max_requests: u32,
    window_secs: u64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn EphemeralStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            max_requests: config.max_requests,
            window_secs: config.window_secs,
        }
    }

    fn key(client: &str) -> String {
        format!("ratelimit:{}", client)
    }

    /// 记一次请求并判定是否放行
    pub async fn check(&self, client: &str) -> AppResult<RateLimitDecision> {
        let key = Self::key(client);

        let count = self.store.incr_with_ttl(&key, self.window_secs).await?;

        // 剩余 TTL 决定窗口重置时刻；键刚好过期时回退到整窗
        let ttl = self
            .store
            .ttl(&key)
            .await?
            .unwrap_or(self.window_secs as i64);
        let reset_at = Utc::now().timestamp() + ttl;

        let remaining = (self.max_requests as i64 - count).max(0) as u32;

        Ok(RateLimitDecision {
            allowed: count <= self.max_requests as i64,
            limit: self.max_requests,
            remaining,
            reset_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// 内存版存储：单把互斥锁保证逐键操作的原子性
    struct InMemoryStore {
        data: Mutex<HashMap<String, (String, Option<Instant>)>>,
    }

    impl InMemoryStore {
        fn new() -> Self {
            Self {
                data: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl EphemeralStore for InMemoryStore {
        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            let mut data = self.data.lock().unwrap();
            match data.get(key) {
                Some((_, Some(expires))) if *expires <= Instant::now() => {
                    data.remove(key);
                    Ok(None)
                }
                Some((value, _)) => Ok(Some(value.clone())),
                None => Ok(None),
            }
        }

        async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
            self.data.lock().unwrap().insert(
                key.to_string(),
                (value.to_string(), Some(Instant::now() + ttl)),
            );
            Ok(())
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.data.lock().unwrap().remove(key);
            Ok(())
        }

        async fn incr_with_ttl(&self, key: &str, ttl_seconds: u64) -> AppResult<i64> {
            let mut data = self.data.lock().unwrap();

            let expired = matches!(
                data.get(key),
                Some((_, Some(expires))) if *expires <= Instant::now()
            );
            if expired {
                data.remove(key);
            }

            match data.get_mut(key) {
                Some((value, _)) => {
                    let count: i64 = value.parse().unwrap_or(0) + 1;
                    *value = count.to_string();
                    Ok(count)
                }
                None => {
                    data.insert(
                        key.to_string(),
                        (
                            "1".to_string(),
                            Some(Instant::now() + Duration::from_secs(ttl_seconds)),
                        ),
                    );
                    Ok(1)
                }
            }
        }

        async fn ttl(&self, key: &str) -> AppResult<Option<i64>> {
            let data = self.data.lock().unwrap();
            match data.get(key) {
                Some((_, Some(expires))) => {
                    let remaining = expires.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        Ok(None)
                    } else {
                        Ok(Some(remaining.as_secs() as i64))
                    }
                }
                Some((_, None)) => Ok(None),
                None => Ok(None),
            }
        }
    }

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            Arc::new(InMemoryStore::new()),
            &RateLimitConfig {
                max_requests,
                window_secs,
            },
        )
    }

    #[tokio::test]
    async fn test_requests_within_limit_allowed() {
        let limiter = limiter(3, 60);

        for expected_remaining in [2u32, 1, 0] {
            let decision = limiter.check("1.2.3.4").await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.limit, 3);
            assert_eq!(decision.remaining, expected_remaining);
        }
    }

    #[tokio::test]
    async fn test_request_over_limit_denied() {
        let limiter = limiter(3, 60);

        for _ in 0..3 {
            assert!(limiter.check("1.2.3.4").await.unwrap().allowed);
        }

        let decision = limiter.check("1.2.3.4").await.unwrap();
        assert!(!decision.allowed);
        // remaining 不出现负数
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn test_clients_are_counted_independently() {
        let limiter = limiter(1, 60);

        assert!(limiter.check("1.2.3.4").await.unwrap().allowed);
        assert!(!limiter.check("1.2.3.4").await.unwrap().allowed);

        // 另一个客户端不受影响
        assert!(limiter.check("5.6.7.8").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_window_expiry_resets_counter() {
        let limiter = limiter(1, 1);

        assert!(limiter.check("1.2.3.4").await.unwrap().allowed);
        assert!(!limiter.check("1.2.3.4").await.unwrap().allowed);

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(limiter.check("1.2.3.4").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_reset_at_is_in_the_future() {
        let limiter = limiter(10, 60);

        let before = Utc::now().timestamp();
        let decision = limiter.check("1.2.3.4").await.unwrap();

        assert!(decision.reset_at > before);
        assert!(decision.reset_at <= before + 61);
    }
}
