//! 仓储接口
//!
//! 存储是唯一性与原子性的最终权威：应用层的预检查天然存在竞态，
//! 并发冲突最终由存储的唯一约束裁决。

use async_trait::async_trait;
use gatehouse_common::UserId;
use gatehouse_errors::AppResult;

use crate::domain::audit::AuditEntry;
use crate::domain::user::{NewUser, User};

/// 用户仓储
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 创建用户并返回存储分配 id 后的完整记录
    ///
    /// 唯一约束冲突映射为 `DuplicateIdentity`。
    async fn create(&self, user: &NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    async fn exists_by_phone(&self, phone: &str) -> AppResult<bool>;

    /// 全量更新可变字段并写入 updated_at
    ///
    /// 目标行不存在时返回 `NotFound`。
    async fn update(&self, user: &User) -> AppResult<()>;

    /// 原子地将 verified 置为 true
    ///
    /// 目标邮箱不存在时返回 `NotFound`，重复调用是幂等的。
    async fn set_verified(&self, email: &str) -> AppResult<()>;
}

/// 审计日志仓储
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> AppResult<()>;
}
