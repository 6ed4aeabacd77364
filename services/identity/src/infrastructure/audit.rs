//! 审计日志管道
//!
//! 请求路径只把条目投进通道即返回，落库由后台 worker 完成。
//! 写入失败记日志丢弃，绝不回传到请求路径。

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::audit::AuditEntry;
use crate::domain::repositories::AuditLogRepository;

/// 审计日志记录器
///
/// 可随意克隆，所有克隆共享同一后台 worker。
/// 全部克隆释放后通道关闭，worker 排空剩余条目并退出。
#[derive(Clone)]
pub struct AuditLogger {
    tx: mpsc::UnboundedSender<AuditEntry>,
}

impl AuditLogger {
    /// 启动后台 worker 并返回记录器与 worker 句柄
    pub fn spawn(repository: Arc<dyn AuditLogRepository>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<AuditEntry>();

        let handle = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(e) = repository.append(&entry).await {
                    warn!(
                        error = %e,
                        user_id = %entry.user_id,
                        action = %entry.action,
                        "Failed to persist audit entry, dropping"
                    );
                }
            }
            debug!("Audit worker drained and stopped");
        });

        (Self { tx }, handle)
    }

    /// 投递一条审计条目，立即返回
    pub fn record(&self, entry: AuditEntry) {
        if self.tx.send(entry).is_err() {
            warn!("Audit channel closed, entry dropped");
        }
    }
}
