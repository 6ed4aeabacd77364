//! 密码哈希值对象

use serde::{Deserialize, Serialize};
use std::fmt;

/// 哈希后的密码
///
/// 只承载不透明的哈希串，哈希与校验逻辑在 `services::password` 中。
/// Display 输出固定为 [REDACTED]，防止哈希串进入日志。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedPassword(pub String);

impl HashedPassword {
    /// 从已有的哈希字符串创建
    pub fn from_hash(hash: String) -> Self {
        Self(hash)
    }

    /// 获取字符串引用
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_redacted() {
        let hash = HashedPassword::from_hash("$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string());
        assert_eq!(format!("{}", hash), "[REDACTED]");
    }

    #[test]
    fn test_as_str_returns_raw_hash() {
        let hash = HashedPassword::from_hash("raw-hash".to_string());
        assert_eq!(hash.as_str(), "raw-hash");
    }
}
