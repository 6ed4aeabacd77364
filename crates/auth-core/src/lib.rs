//! gatehouse-auth-core - 访问令牌核心库
//!
//! 提供 HS256 JWT 的签发与校验。令牌载荷只包含用户标识、
//! 邮箱和绝对过期时间，校验时不允许任何时钟宽限。

use chrono::Utc;
use gatehouse_common::UserId;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 令牌层错误
///
/// 签发失败与校验失败分开建模，由服务层映射到统一错误类型。
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl From<TokenError> for gatehouse_errors::AppError {
    fn from(err: TokenError) -> Self {
        match err {
            // 校验失败对外统一为凭证无效，细节只进日志
            TokenError::Invalid(_) => gatehouse_errors::AppError::InvalidCredentials,
            TokenError::Signing(msg) => {
                gatehouse_errors::AppError::internal(format!("Token signing failed: {}", msg))
            }
        }
    }
}

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID(字符串形式)
    pub sub: String,
    /// 用户邮箱
    pub email: String,
    /// 签发时间(Unix 秒)
    pub iat: i64,
    /// 过期时间(Unix 秒)
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: UserId, email: &str, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + expires_in_secs,
        }
    }

    /// 从 sub 解析用户 ID
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|_| TokenError::Invalid("subject is not a numeric user id".to_string()))
    }
}

/// 令牌服务
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
}

impl TokenService {
    /// 创建令牌服务
    ///
    /// # Arguments
    /// * `secret` - HMAC 签名密钥
    /// * `expires_in` - 令牌有效期(秒)
    pub fn new(secret: &str, expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    /// 签发令牌
    pub fn generate_token(&self, user_id: UserId, email: &str) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, email, self.expires_in);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// 校验令牌并返回 Claims
    ///
    /// 过期、签名不符或格式错误一律返回 `TokenError::Invalid`。
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// 令牌有效期(秒)
    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }
}
