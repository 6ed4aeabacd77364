//! 持久化实现

mod migrations;
mod postgres_audit_log_repository;
mod postgres_user_repository;

pub use migrations::migrations;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_user_repository::PostgresUserRepository;
