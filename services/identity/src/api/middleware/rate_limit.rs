//! 限流中间件

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use gatehouse_errors::AppError;
use std::sync::Arc;
use tracing::warn;

use crate::api::error::ApiError;
use crate::api::extract::client_info;
use crate::services::{RateLimitDecision, RateLimiter};

/// 按客户端地址限流
///
/// 被拒的响应同样携带限流响应头。存储不可用时放行，
/// 限流是保护措施，不能反过来把服务打挂。
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_info(&request);

    match limiter.check(&client.ip).await {
        Ok(decision) if decision.allowed => {
            let mut response = next.run(request).await;
            apply_headers(response.headers_mut(), &decision);
            response
        }
        Ok(decision) => {
            warn!(client = %client.ip, "Rate limit exceeded");
            let mut response = ApiError::from(AppError::RateLimited).into_response();
            apply_headers(response.headers_mut(), &decision);
            response
        }
        Err(e) => {
            warn!(error = %e, "Rate limit counter unavailable, letting request through");
            next.run(request).await
        }
    }
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert("X-RateLimit-Limit", HeaderValue::from(decision.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(decision.reset_at));
}
