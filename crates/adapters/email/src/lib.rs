//! Email 适配器
//!
//! 通过 SMTP 发送纯文本邮件。

mod client;

pub use client::SmtpEmailClient;

use gatehouse_errors::AppResult;

/// 邮件发送接口
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送纯文本邮件
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}
