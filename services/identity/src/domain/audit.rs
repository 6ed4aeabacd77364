//! 审计日志条目

use gatehouse_common::{ClientInfo, UserId};

/// 审计日志条目
///
/// 追加写入，请求路径不回读。
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub user_id: UserId,
    pub action: String,
    pub status: String,
    pub ip: String,
    pub user_agent: String,
}

impl AuditEntry {
    pub fn new(
        user_id: UserId,
        action: impl Into<String>,
        status: impl Into<String>,
        client: &ClientInfo,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            status: status.into(),
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_entry_captures_client() {
        let client = ClientInfo::new("10.0.0.1", "curl/8.0");
        let entry = AuditEntry::new(UserId::new(7), "login", "success", &client);

        assert_eq!(entry.user_id, UserId::new(7));
        assert_eq!(entry.action, "login");
        assert_eq!(entry.status, "success");
        assert_eq!(entry.ip, "10.0.0.1");
        assert_eq!(entry.user_agent, "curl/8.0");
    }
}
