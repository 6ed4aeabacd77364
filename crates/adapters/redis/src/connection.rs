//! Redis 连接

use gatehouse_errors::{AppError, AppResult};
use redis::Client;
use redis::aio::ConnectionManager;

/// 建立自动重连的连接管理器
///
/// `ConnectionManager` 内部处理断线重连，调用方克隆句柄即可并发使用。
pub async fn create_connection_manager(url: &str) -> AppResult<ConnectionManager> {
    let client = Client::open(url)
        .map_err(|e| AppError::store_unavailable(format!("Redis url rejected: {}", e)))?;

    let manager = ConnectionManager::new(client)
        .await
        .map_err(|e| AppError::store_unavailable(format!("Redis connect failed: {}", e)))?;

    Ok(manager)
}

/// 连通性探测，健康检查走这里
pub async fn check_connection(conn: &mut ConnectionManager) -> AppResult<()> {
    redis::cmd("PING")
        .query_async::<String>(conn)
        .await
        .map(|_| ())
        .map_err(|e| AppError::store_unavailable(format!("Redis probe failed: {}", e)))
}
