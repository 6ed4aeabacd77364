//! 认证中间件

use axum::extract::{FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use gatehouse_auth_core::{Claims, TokenService};
use tracing::{debug, warn};

use crate::infrastructure::cache::TokenBlacklist;

/// 认证中间件所需的最小状态
#[derive(Clone)]
pub struct AuthGuard {
    pub tokens: TokenService,
    pub blacklist: TokenBlacklist,
}

/// 原始 Bearer 令牌
///
/// 注销时需要拿到令牌原文写入黑名单。
#[derive(Debug, Clone)]
pub struct AuthToken(pub String);

/// 当前用户提取器
///
/// 从请求扩展读取认证中间件注入的 Claims，
/// 必须位于 `auth_middleware` 之后。
pub struct CurrentUser(pub Claims);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Claims>() {
            Some(claims) => Ok(CurrentUser(claims.clone())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                "Request reached a protected handler without authentication",
            )),
        }
    }
}

/// Bearer 令牌认证中间件
///
/// 依次校验签名与过期时间、查黑名单，
/// 通过后把 Claims 和令牌原文注入请求扩展。
/// 黑名单存储不可用时放行：令牌本身的密码学校验已通过。
pub async fn auth_middleware(
    State(guard): State<AuthGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let bearer = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = bearer.map(String::from) else {
        warn!("Authorization header absent or not a bearer token");
        return Err(StatusCode::UNAUTHORIZED);
    };

    debug!("Validating bearer token");
    let claims = guard.tokens.validate_token(&token).map_err(|e| {
        warn!(error = %e, "Bearer token rejected");
        StatusCode::UNAUTHORIZED
    })?;

    match guard.blacklist.is_revoked(&token).await {
        Ok(true) => {
            warn!(user_id = %claims.sub, "Rejected blacklisted token");
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(false) => {}
        Err(e) => {
            warn!(error = %e, "Blacklist check failed, allowing request");
        }
    }

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(AuthToken(token));

    Ok(next.run(request).await)
}
