//! Email 值对象

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error)]
#[error("Invalid email format: {0}")]
pub struct InvalidEmail(String);

/// 规范化后的邮箱地址
///
/// 构造即校验（RFC 5322），去除首尾空白并统一小写，
/// 存储与查找因此使用同一规范形式。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(pub String);

impl Email {
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidEmail> {
        let raw = raw.into();
        let trimmed = raw.trim();

        if !email_address::EmailAddress::is_valid(trimmed) {
            return Err(InvalidEmail(raw));
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for addr in [
            "user@example.com",
            "user.name@example.com",
            "user+tag@example.co.uk",
            "user_name@example-domain.com",
        ] {
            assert!(Email::new(addr).is_ok(), "{addr} should parse");
        }
    }

    #[test]
    fn test_rejects_malformed_input() {
        for addr in [
            "",
            "userexample.com",
            "user@@example.com",
            "@example.com",
            "user@",
            "user name@example.com",
        ] {
            assert!(Email::new(addr).is_err(), "{addr} should be rejected");
        }
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(
            Email::new("  User@Example.COM ").unwrap().as_str(),
            "user@example.com"
        );
    }
}
