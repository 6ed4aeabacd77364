//! 账户用例编排
//!
//! 注册、登录、邮箱验证、资料管理与令牌作废的完整流程。
//! 唯一性预检查挡住常见冲突，并发下的最终裁决权在存储的唯一约束。

use std::sync::Arc;
use tracing::{info, warn};

use gatehouse_adapter_email::EmailSender;
use gatehouse_auth_core::TokenService;
use gatehouse_common::{ClientInfo, UserId};
use gatehouse_errors::{AppError, AppResult};

use crate::domain::audit::AuditEntry;
use crate::domain::repositories::UserRepository;
use crate::domain::user::{NewUser, User};
use crate::domain::value_objects::Email;
use crate::infrastructure::audit::AuditLogger;
use crate::infrastructure::cache::{TokenBlacklist, VerificationStore};
use crate::services::otp::generate_otp;
use crate::services::password::PasswordHasher;

const VERIFICATION_SUBJECT: &str = "Verify your email";

/// 注册请求
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

/// 账户服务
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    email_sender: Arc<dyn EmailSender>,
    verification: VerificationStore,
    blacklist: TokenBlacklist,
    hasher: PasswordHasher,
    tokens: TokenService,
    audit: AuditLogger,
}

impl AccountService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        email_sender: Arc<dyn EmailSender>,
        verification: VerificationStore,
        blacklist: TokenBlacklist,
        hasher: PasswordHasher,
        tokens: TokenService,
        audit: AuditLogger,
    ) -> Self {
        Self {
            users,
            email_sender,
            verification,
            blacklist,
            hasher,
            tokens,
            audit,
        }
    }

    /// 注册新用户
    ///
    /// 验证码先于用户记录写入，只要用户到达"已创建"状态，
    /// 验证码一定已经存在。用户创建成功后邮件发送失败不回滚，
    /// 以 `NotificationFailure` 告知调用方，补发验证码是恢复路径。
    pub async fn register(&self, registration: Registration) -> AppResult<User> {
        let email = Email::new(&registration.email)
            .map_err(|e| AppError::validation(e.to_string()))?;

        if self.users.exists_by_email(email.as_str()).await? {
            return Err(AppError::duplicate_identity("Email already registered"));
        }

        let phone = registration
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from);

        if let Some(ref phone) = phone {
            if self.users.exists_by_phone(phone).await? {
                return Err(AppError::duplicate_identity(
                    "Phone number already registered",
                ));
            }
        }

        let password_hash = self.hasher.hash(&registration.password)?;

        let otp = generate_otp();
        self.verification.put(email.as_str(), &otp).await?;

        let user = self
            .users
            .create(&NewUser::new(email, password_hash, registration.name, phone))
            .await?;

        info!(user_id = %user.id, "User registered");

        let body = self.verification_body(&otp);
        if let Err(e) = self
            .email_sender
            .send_text_email(user.email.as_str(), VERIFICATION_SUBJECT, &body)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Verification email failed, user remains created");
            return Err(e);
        }

        Ok(user)
    }

    /// 登录并签发令牌
    ///
    /// 用户不存在与密码错误返回同一个 `InvalidCredentials`，
    /// 调用方无法据此枚举账号。审计写入不阻塞响应。
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> AppResult<String> {
        let email = email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_verified() {
            return Err(AppError::EmailNotVerified);
        }

        let token = self.tokens.generate_token(user.id, user.email.as_str())?;

        self.audit
            .record(AuditEntry::new(user.id, "login", "success", client));

        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    /// 校验邮箱验证码并标记邮箱已验证
    ///
    /// 验证码做精确字符串比对，不做任何归一化。
    /// 错误的验证码不消耗正确的那个，到 TTL 之前都可以重试。
    pub async fn verify_email(&self, email: &str, otp: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();

        let stored = self.verification.get(&email).await?;
        match stored {
            Some(ref code) if code == otp => {}
            _ => return Err(AppError::InvalidOtp),
        }

        self.users.set_verified(&email).await?;

        info!(email = %email, "Email verified");
        Ok(())
    }

    /// 补发验证码
    ///
    /// 已验证的邮箱静默成功，不重发。新码覆盖旧码并重置 TTL。
    pub async fn resend_verification(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if user.is_verified() {
            return Ok(());
        }

        let otp = generate_otp();
        self.verification.put(&email, &otp).await?;

        let body = self.verification_body(&otp);
        self.email_sender
            .send_text_email(&email, VERIFICATION_SUBJECT, &body)
            .await?;

        info!(user_id = %user.id, "Verification code resent");
        Ok(())
    }

    /// 按令牌主体查询用户资料
    pub async fn get_profile(&self, user_id: &str) -> AppResult<User> {
        let id = UserId::from_string(user_id)
            .map_err(|_| AppError::invalid_identifier(format!("Invalid user id: {}", user_id)))?;

        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// 更新用户资料
    ///
    /// 手机号变更且非空时重查唯一性，phone 传 None 表示清除。
    pub async fn update_profile(
        &self,
        user_id: &str,
        name: String,
        phone: Option<String>,
    ) -> AppResult<User> {
        let id = UserId::from_string(user_id)
            .map_err(|_| AppError::invalid_identifier(format!("Invalid user id: {}", user_id)))?;

        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let phone = phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from);

        if let Some(new_phone) = user.phone_changed_to(&phone) {
            if self.users.exists_by_phone(new_phone).await? {
                return Err(AppError::duplicate_identity(
                    "Phone number already registered",
                ));
            }
        }

        user.apply_profile(name, phone);
        self.users.update(&user).await?;

        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// 作废令牌
    ///
    /// 黑名单条目的 TTL 与令牌最长有效期一致。
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.blacklist.revoke(token).await?;
        info!("Token invalidated");
        Ok(())
    }

    fn verification_body(&self, otp: &str) -> String {
        format!(
            "Your verification code is: {}\nValid for {} minutes.",
            otp,
            self.verification.ttl_minutes()
        )
    }
}
