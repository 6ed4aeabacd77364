//! 客户端信息提取

use axum::extract::{ConnectInfo, FromRequestParts, Request};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};
use gatehouse_common::ClientInfo;
use std::convert::Infallible;
use std::net::SocketAddr;

/// 从请求头与连接信息推导客户端标识
///
/// 反向代理场景优先取 X-Forwarded-For 的第一跳，再看 X-Real-IP，
/// 其次取对端地址，全部缺失时记为 unknown。
fn resolve(headers: &HeaderMap, extensions: &Extensions) -> ClientInfo {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .or_else(|| {
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    ClientInfo::new(ip, user_agent)
}

/// 面向中间件的提取入口
pub fn client_info(request: &Request) -> ClientInfo {
    resolve(request.headers(), request.extensions())
}

/// 客户端信息提取器
///
/// 不依赖任何前置中间件，可直接用于 handler 签名。
pub struct Client(pub ClientInfo);

impl<S> FromRequestParts<S> for Client
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Client(resolve(&parts.headers, &parts.extensions)))
    }
}
