//! 通用健康检查类型
//!
//! 聚合各依赖组件的连通性状态，由服务的健康端点返回

use serde::{Deserialize, Serialize};

/// 单个依赖组件的健康状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            name: name.into(),
            healthy: true,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    pub fn unhealthy(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: false,
            latency_ms: None,
            error: Some(error.into()),
        }
    }
}

/// 聚合健康检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub components: Vec<ComponentHealth>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self {
            healthy: true,
            components: Vec::new(),
        }
    }

    pub fn add(&mut self, component: ComponentHealth) {
        if !component.healthy {
            self.healthy = false;
        }
        self.components.push(component);
    }
}

impl Default for HealthReport {
    fn default() -> Self {
        Self::new()
    }
}
