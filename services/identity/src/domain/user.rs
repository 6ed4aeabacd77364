//! 用户实体

use chrono::{DateTime, Utc};
use gatehouse_common::UserId;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Email, HashedPassword};

/// 待创建的用户
///
/// id 由存储层在插入时分配，创建前不存在。
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: HashedPassword,
    pub name: String,
    pub phone: Option<String>,
}

impl NewUser {
    pub fn new(
        email: Email,
        password_hash: HashedPassword,
        name: impl Into<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            email,
            password_hash,
            name: name.into(),
            phone,
        }
    }
}

/// 用户实体
///
/// verified 只会从 false 变为 true，不存在反向迁移。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub name: String,
    pub phone: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 标记邮箱已验证
    ///
    /// 重复调用是幂等的。
    pub fn mark_verified(&mut self) {
        self.verified = true;
        self.updated_at = Utc::now();
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// 应用资料变更并刷新 updated_at
    ///
    /// phone 传 None 表示清除手机号。
    pub fn apply_profile(&mut self, name: impl Into<String>, phone: Option<String>) {
        self.name = name.into();
        self.phone = phone;
        self.updated_at = Utc::now();
    }

    /// 手机号是否发生变化且新值非空
    pub fn phone_changed_to<'a>(&self, phone: &'a Option<String>) -> Option<&'a str> {
        match phone {
            Some(p) if !p.is_empty() && self.phone.as_deref() != Some(p.as_str()) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User {
            id: UserId::new(1),
            email: Email::new("test@example.com").unwrap(),
            password_hash: HashedPassword::from_hash("hash".to_string()),
            name: "Test User".to_string(),
            phone: Some("13800138000".to_string()),
            verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_user_is_unverified() {
        let user = create_test_user();
        assert!(!user.is_verified());
    }

    #[test]
    fn test_mark_verified() {
        let mut user = create_test_user();
        user.mark_verified();

        assert!(user.is_verified());
    }

    #[test]
    fn test_mark_verified_is_idempotent() {
        let mut user = create_test_user();
        user.mark_verified();
        user.mark_verified();

        assert!(user.is_verified());
    }

    #[test]
    fn test_apply_profile_stamps_updated_at() {
        let mut user = create_test_user();
        let before = user.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        user.apply_profile("New Name", Some("13900139000".to_string()));

        assert_eq!(user.name, "New Name");
        assert_eq!(user.phone.as_deref(), Some("13900139000"));
        assert!(user.updated_at > before);
    }

    #[test]
    fn test_apply_profile_clears_phone() {
        let mut user = create_test_user();
        user.apply_profile("Test User", None);

        assert!(user.phone.is_none());
    }

    #[test]
    fn test_phone_changed_to() {
        let user = create_test_user();

        // 新手机号
        assert_eq!(
            user.phone_changed_to(&Some("13900139000".to_string())),
            Some("13900139000")
        );

        // 与当前相同
        assert_eq!(user.phone_changed_to(&Some("13800138000".to_string())), None);

        // 空值与 None 都不算变化
        assert_eq!(user.phone_changed_to(&Some(String::new())), None);
        assert_eq!(user.phone_changed_to(&None), None);
    }
}
