//! API 错误响应

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gatehouse_errors::AppError;
use tracing::error;

/// 把 AppError 映射为带稳定 kind 的 JSON 响应
///
/// 响应体由 `AppError::to_body` 生成，内部错误细节在此处
/// 记入日志后即丢弃。
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "Request failed");
        }

        (status, Json(self.0.to_body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_duplicate_identity_maps_to_conflict() {
        let (status, body) = body_json(AppError::duplicate_identity("Email already registered")).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "duplicate_identity");
        assert_eq!(body["message"], "Identity already registered: Email already registered");
    }

    #[tokio::test]
    async fn test_rate_limited_maps_to_429() {
        let (status, body) = body_json(AppError::RateLimited).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "rate_limited");
    }

    #[tokio::test]
    async fn test_store_errors_do_not_leak_details() {
        let (status, body) =
            body_json(AppError::store_unavailable("pool timed out: backend 10.1.2.3")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Service temporarily unavailable");
    }
}
