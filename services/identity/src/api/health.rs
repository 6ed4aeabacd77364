//! 健康检查端点
//!
//! 依次探测两个存储的连通性，任一不可达则整体不健康并返回 503。
//! 探测失败的细节只进日志，响应里只有组件名和通用标记。

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use gatehouse_common::{ComponentHealth, HealthReport};
use std::time::Instant;
use tracing::warn;

use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let mut report = HealthReport::new();
    report.add(check_postgres(&state).await);
    report.add(check_redis(&state).await);

    let code = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(report))
}

async fn check_postgres(state: &AppState) -> ComponentHealth {
    let started = Instant::now();
    match gatehouse_adapter_postgres::check_connection(&state.pool).await {
        Ok(()) => ComponentHealth::healthy("postgres", started.elapsed().as_millis() as u64),
        Err(e) => {
            warn!(error = %e, "Postgres health check failed");
            ComponentHealth::unhealthy("postgres", "unreachable")
        }
    }
}

async fn check_redis(state: &AppState) -> ComponentHealth {
    let started = Instant::now();
    let mut conn = state.redis.clone();
    match gatehouse_adapter_redis::check_connection(&mut conn).await {
        Ok(()) => ComponentHealth::healthy("redis", started.elapsed().as_millis() as u64),
        Err(e) => {
            warn!(error = %e, "Redis health check failed");
            ComponentHealth::unhealthy("redis", "unreachable")
        }
    }
}
