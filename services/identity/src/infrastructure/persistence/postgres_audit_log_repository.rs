//! PostgreSQL 审计日志仓储实现

use async_trait::async_trait;
use gatehouse_errors::{AppError, AppResult};
use sqlx::PgPool;

use crate::domain::audit::AuditEntry;
use crate::domain::repositories::AuditLogRepository;

pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn append(&self, entry: &AuditEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, action, status, ip, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.user_id.value())
        .bind(&entry.action)
        .bind(&entry.status)
        .bind(&entry.ip)
        .bind(&entry.user_agent)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::store_unavailable(format!("Failed to append audit entry: {}", e)))?;

        Ok(())
    }
}
