//! 验证码存储
//!
//! 每个邮箱最多一个在期验证码，重新签发直接覆盖旧值。

use gatehouse_errors::AppResult;
use gatehouse_ports::EphemeralStore;
use std::sync::Arc;
use std::time::Duration;

/// 验证码存储
#[derive(Clone)]
pub struct VerificationStore {
    store: Arc<dyn EphemeralStore>,
    ttl: Duration,
}

impl VerificationStore {
    pub fn new(store: Arc<dyn EphemeralStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// 验证码有效期（分钟），用于拼装邮件正文
    pub fn ttl_minutes(&self) -> u64 {
        self.ttl.as_secs() / 60
    }

    fn key(email: &str) -> String {
        format!("otp:{}", email)
    }

    /// 写入验证码，覆盖同邮箱的旧码并重置 TTL
    pub async fn put(&self, email: &str, code: &str) -> AppResult<()> {
        self.store.set(&Self::key(email), code, self.ttl).await
    }

    /// 读取在期验证码，过期或不存在返回 None
    pub async fn get(&self, email: &str) -> AppResult<Option<String>> {
        self.store.get(&Self::key(email)).await
    }

    /// 主动作废验证码
    pub async fn remove(&self, email: &str) -> AppResult<()> {
        self.store.delete(&Self::key(email)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemoryStore {
        data: Mutex<HashMap<String, String>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                data: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl EphemeralStore for MemoryStore {
        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl: Duration) -> AppResult<()> {
            self.data
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.data.lock().unwrap().remove(key);
            Ok(())
        }

        async fn incr_with_ttl(&self, _key: &str, _ttl_seconds: u64) -> AppResult<i64> {
            unreachable!("not used by verification store")
        }

        async fn ttl(&self, _key: &str) -> AppResult<Option<i64>> {
            Ok(None)
        }
    }

    fn store() -> VerificationStore {
        VerificationStore::new(Arc::new(MemoryStore::new()), Duration::from_secs(900))
    }

    #[tokio::test]
    async fn test_put_overwrites_previous_code() {
        let store = store();

        store.put("a@b.com", "111111").await.unwrap();
        store.put("a@b.com", "222222").await.unwrap();

        assert_eq!(
            store.get("a@b.com").await.unwrap().as_deref(),
            Some("222222")
        );
    }

    #[tokio::test]
    async fn test_remove_discards_code() {
        let store = store();

        store.put("a@b.com", "111111").await.unwrap();
        store.remove("a@b.com").await.unwrap();

        assert_eq!(store.get("a@b.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_scoped_per_email() {
        let store = store();

        store.put("a@b.com", "111111").await.unwrap();

        assert_eq!(store.get("c@d.com").await.unwrap(), None);
    }

    #[test]
    fn test_ttl_minutes() {
        assert_eq!(store().ttl_minutes(), 15);
    }
}
