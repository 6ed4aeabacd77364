//! SMTP 发信客户端

use crate::EmailSender;
use gatehouse_config::EmailConfig;
use gatehouse_errors::{AppError, AppResult};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, info};

/// 基于 lettre 同步传输的客户端，发送放到 blocking 线程池
pub struct SmtpEmailClient {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpEmailClient {
    /// 发件地址与传输参数在构造时校验，坏配置挡在启动期
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid from address: {}", e)))?;

        let builder = if config.use_tls {
            SmtpTransport::starttls_relay(&config.smtp_host)
        } else {
            SmtpTransport::relay(&config.smtp_host)
        }
        .map_err(|e| AppError::internal(format!("SMTP relay setup failed: {}", e)))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self { transport, from })
    }

    fn compose(&self, to: &str, subject: &str, body: &str) -> AppResult<Message> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::validation(format!("Invalid recipient address: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::internal(format!("Message build failed: {}", e)))
    }
}

#[async_trait::async_trait]
impl EmailSender for SmtpEmailClient {
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        debug!(to = %to, subject = %subject, "Sending email");

        let message = self.compose(to, subject, body)?;
        let transport = self.transport.clone();

        // lettre 的 SmtpTransport 是同步 API，不能占用 async 工作线程
        tokio::task::spawn_blocking(move || {
            transport
                .send(&message)
                .map_err(|e| AppError::notification_failure(format!("Email send failed: {}", e)))
        })
        .await
        .map_err(|e| AppError::internal(format!("Send task join failed: {}", e)))??;

        info!(to = %to, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "user@example.com".to_string(),
            password: Secret::new("password".to_string()),
            from_email: "noreply@example.com".to_string(),
            from_name: "Gatehouse".to_string(),
            use_tls: true,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_new_rejects_bad_from_address() {
        let mut bad = config();
        bad.from_email = "not an address".to_string();

        assert!(SmtpEmailClient::new(&bad).is_err());
    }

    #[test]
    fn test_compose_builds_plain_text() {
        let client = SmtpEmailClient::new(&config()).unwrap();

        assert!(client.compose("test@example.com", "Hello", "Body").is_ok());
    }

    #[test]
    fn test_compose_rejects_bad_recipient() {
        let client = SmtpEmailClient::new(&config()).unwrap();

        assert!(client.compose("not an address", "Hello", "Body").is_err());
    }
}
