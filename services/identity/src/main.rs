//! Gatehouse Identity Service - 服务入口

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gatehouse_adapter_email::{EmailSender, SmtpEmailClient};
use gatehouse_adapter_postgres::{MigrationManager, PostgresConfig, create_pool};
use gatehouse_adapter_redis::{RedisStore, create_connection_manager};
use gatehouse_auth_core::TokenService;
use gatehouse_common::{RetryConfig, with_retry};
use gatehouse_config::AppConfig;
use gatehouse_errors::AppError;
use gatehouse_ports::EphemeralStore;
use secrecy::ExposeSecret;
use tracing::{error, info};

use gatehouse_identity::api::build_router;
use gatehouse_identity::domain::repositories::{AuditLogRepository, UserRepository};
use gatehouse_identity::infrastructure::audit::AuditLogger;
use gatehouse_identity::infrastructure::cache::{TokenBlacklist, VerificationStore};
use gatehouse_identity::infrastructure::persistence::{
    PostgresAuditLogRepository, PostgresUserRepository, migrations,
};
use gatehouse_identity::services::{AccountService, PasswordHasher, RateLimiter};
use gatehouse_identity::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load("config")?;

    if config.is_production() {
        gatehouse_telemetry::init_tracing_json(&config.telemetry.log_level);
    } else {
        gatehouse_telemetry::init_tracing(&config.telemetry.log_level);
    }

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        "Starting identity service"
    );

    let retry = RetryConfig::default();

    // Postgres 连接与迁移
    let pg_config = PostgresConfig::new(config.database.url.expose_secret())
        .with_max_connections(config.database.max_connections);
    let pool = with_retry(&retry, "postgres_connect", || create_pool(&pg_config)).await?;

    let result = MigrationManager::new(pool.clone())
        .migrate(&migrations())
        .await?;
    if !result.is_success() {
        for e in &result.errors {
            error!(version = e.version, name = %e.name, error = %e.error, "Migration failed");
        }
        return Err(AppError::internal("Database migration failed").into());
    }
    info!(
        applied = result.applied_count(),
        skipped = result.skipped.len(),
        "Migrations complete"
    );

    // Redis
    let redis = with_retry(&retry, "redis_connect", || {
        create_connection_manager(config.redis.url.expose_secret())
    })
    .await?;
    let store: Arc<dyn EphemeralStore> = Arc::new(RedisStore::new(redis.clone()));

    // 组装仓储与审计
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    let audit_repo: Arc<dyn AuditLogRepository> =
        Arc::new(PostgresAuditLogRepository::new(pool.clone()));
    let (audit, audit_worker) = AuditLogger::spawn(audit_repo);

    // 组装邮件客户端
    let email_sender: Arc<dyn EmailSender> = Arc::new(SmtpEmailClient::new(&config.email)?);

    // 组装核心服务
    let verification = VerificationStore::new(
        store.clone(),
        Duration::from_secs(config.otp.ttl_minutes * 60),
    );
    let blacklist = TokenBlacklist::new(store.clone(), Duration::from_secs(config.jwt.expires_in));
    let hasher = PasswordHasher::new(&config.hashing)?;
    let tokens = TokenService::new(
        config.jwt.secret.expose_secret(),
        config.jwt.expires_in as i64,
    );
    let rate_limiter = Arc::new(RateLimiter::new(store, &config.rate_limit));

    let accounts = Arc::new(AccountService::new(
        users,
        email_sender,
        verification,
        blacklist.clone(),
        hasher,
        tokens.clone(),
        audit,
    ));

    let state = AppState {
        accounts,
        tokens,
        blacklist,
        rate_limiter,
        pool,
        redis,
        app_name: config.app_name.clone(),
    };

    let app = build_router(state, &config.cors);

    // 启动服务器
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // 路由已随 serve 释放，审计发送端全部关闭，等 worker 排空队列
    info!("Server stopped, draining audit queue");
    let _ = audit_worker.await;

    Ok(())
}

/// 等待关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
