//! gatehouse-errors - 统一错误处理
//!
//! 错误分类对外暴露稳定的 kind 标识，内部细节（驱动错误、堆栈）不外泄

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
///
/// `InvalidCredentials` 对"用户不存在"和"密码错误"返回同一错误，
/// 防止账号枚举，不得拆分为可区分的错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Identity already registered: {0}")]
    DuplicateIdentity(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email address has not been verified")]
    EmailNotVerified,

    #[error("Invalid or expired verification code")]
    InvalidOtp,

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Password hashing failed: {0}")]
    HashingFailure(String),

    #[error("Notification dispatch failed: {0}")]
    NotificationFailure(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn duplicate_identity(msg: impl Into<String>) -> Self {
        Self::DuplicateIdentity(msg.into())
    }

    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    pub fn hashing_failure(msg: impl Into<String>) -> Self {
        Self::HashingFailure(msg.into())
    }

    pub fn notification_failure(msg: impl Into<String>) -> Self {
        Self::NotificationFailure(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 稳定的错误类别标识，跨版本不变
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity(_) => "duplicate_identity",
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailNotVerified => "email_not_verified",
            Self::InvalidOtp => "invalid_otp",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::HashingFailure(_) => "hashing_failure",
            Self::NotificationFailure(_) => "notification_failure",
            Self::RateLimited => "rate_limited",
            Self::NotFound(_) => "not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Validation(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::DuplicateIdentity(_) => 409,
            Self::InvalidCredentials => 401,
            Self::EmailNotVerified => 403,
            Self::InvalidOtp => 400,
            Self::InvalidIdentifier(_) => 400,
            Self::HashingFailure(_) => 500,
            Self::NotificationFailure(_) => 502,
            Self::RateLimited => 429,
            Self::NotFound(_) => 404,
            Self::StoreUnavailable(_) => 503,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// 转换为对外响应体
    ///
    /// 内部类错误（哈希、通知、存储、未知）统一替换为固定文案，
    /// 驱动错误信息只进日志不出接口。
    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            Self::HashingFailure(_) => "Failed to process credentials".to_string(),
            Self::NotificationFailure(_) => "Failed to send verification email".to_string(),
            Self::StoreUnavailable(_) => "Service temporarily unavailable".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        ErrorBody {
            error: self.kind().to_string(),
            message,
        }
    }
}

/// 对外错误响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::duplicate_identity("email taken").status_code(), 409);
        assert_eq!(AppError::InvalidCredentials.status_code(), 401);
        assert_eq!(AppError::EmailNotVerified.status_code(), 403);
        assert_eq!(AppError::InvalidOtp.status_code(), 400);
        assert_eq!(AppError::invalid_identifier("abc").status_code(), 400);
        assert_eq!(AppError::RateLimited.status_code(), 429);
        assert_eq!(AppError::not_found("user").status_code(), 404);
        assert_eq!(AppError::store_unavailable("redis down").status_code(), 503);
        assert_eq!(AppError::notification_failure("smtp").status_code(), 502);
        assert_eq!(AppError::hashing_failure("oom").status_code(), 500);
    }

    #[test]
    fn test_kind_is_stable() {
        assert_eq!(AppError::DuplicateIdentity("x".into()).kind(), "duplicate_identity");
        assert_eq!(AppError::InvalidCredentials.kind(), "invalid_credentials");
        assert_eq!(AppError::EmailNotVerified.kind(), "email_not_verified");
        assert_eq!(AppError::InvalidOtp.kind(), "invalid_otp");
        assert_eq!(AppError::RateLimited.kind(), "rate_limited");
        assert_eq!(AppError::StoreUnavailable("x".into()).kind(), "store_unavailable");
    }

    /// 不存在的账号和密码错误必须产生完全相同的对外错误
    #[test]
    fn test_invalid_credentials_is_indistinguishable() {
        let not_found = AppError::InvalidCredentials;
        let wrong_password = AppError::InvalidCredentials;

        assert_eq!(not_found.kind(), wrong_password.kind());
        assert_eq!(not_found.to_string(), wrong_password.to_string());
        assert_eq!(not_found.status_code(), wrong_password.status_code());
    }

    #[test]
    fn test_body_serialization() {
        let body = AppError::not_found("user 42 not found").to_body();
        let json = serde_json::to_string(&body).unwrap();

        assert!(json.contains("\"error\":\"not_found\""));
        assert!(json.contains("user 42 not found"));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            AppError::duplicate_identity("email taken").to_string(),
            "Identity already registered: email taken"
        );
        assert_eq!(
            AppError::RateLimited.to_string(),
            "Too many requests. Please try again later."
        );
    }

    /// 存储和哈希错误携带的驱动信息只进日志，不得出现在响应体里
    #[test]
    fn test_body_redacts_internal_details() {
        let body = AppError::store_unavailable("connection refused (os error 111)").to_body();
        assert_eq!(body.message, "Service temporarily unavailable");
        assert!(!body.message.contains("os error"));

        let body = AppError::hashing_failure("argon2 memory allocation failed").to_body();
        assert_eq!(body.message, "Failed to process credentials");

        let body = AppError::notification_failure("smtp: relay rejected").to_body();
        assert_eq!(body.message, "Failed to send verification email");
    }
}
