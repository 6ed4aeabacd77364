//! HTTP 请求处理器
//!
//! 只做参数校验和 DTO 转换，业务规则全部在 `AccountService`。

use axum::Extension;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use gatehouse_common::UserId;
use gatehouse_errors::AppError;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::api::extract::Client;
use crate::api::middleware::{AuthToken, CurrentUser};
use crate::domain::user::User;
use crate::services::Registration;
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
}

/// 对外的用户资料
///
/// 密码散列永远不进这个结构，序列化里不存在该字段。
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            name: user.name,
            phone: user.phone,
            verified: user.verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    Ok(())
}

/// POST /api/v1/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    validate_password(&request.password)?;
    validate_name(&request.name)?;

    state
        .accounts
        .register(Registration {
            email: request.email,
            password: request.password,
            name: request.name.trim().to_string(),
            phone: request.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Registration successful. Please check your email for verification.",
        )),
    ))
}

/// POST /api/v1/login
pub async fn login(
    State(state): State<AppState>,
    Client(client): Client,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state
        .accounts
        .login(&request.email, &request.password, &client)
        .await?;

    Ok(Json(TokenResponse {
        token,
        expires_in: state.tokens.expires_in(),
    }))
}

/// GET /api/v1/verify?email=...&otp=...
pub async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .accounts
        .verify_email(&params.email, &params.otp)
        .await?;

    Ok(Json(MessageResponse::new("Email verified successfully")))
}

/// POST /api/v1/resend
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(request): Json<ResendRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.accounts.resend_verification(&request.email).await?;

    Ok(Json(MessageResponse::new("Verification email sent")))
}

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state.accounts.get_profile(&claims.sub).await?;

    Ok(Json(ProfileResponse::from(user)))
}

/// PUT /api/v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_name(&request.name)?;

    let user = state
        .accounts
        .update_profile(&claims.sub, request.name.trim().to_string(), request.phone)
        .await?;

    Ok(Json(ProfileResponse::from(user)))
}

/// POST /api/v1/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<AuthToken>,
) -> ApiResult<Json<MessageResponse>> {
    state.accounts.logout(&token.0).await?;

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// GET /
pub async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": state.app_name,
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Email, HashedPassword};

    #[test]
    fn test_validate_password_rejects_short() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Alice").is_ok());
    }

    /// 资料响应不得出现密码散列字段
    #[test]
    fn test_profile_response_has_no_password_field() {
        let user = User {
            id: UserId::new(1),
            email: Email::new("alice@example.com").unwrap(),
            password_hash: HashedPassword::from_hash("$argon2id$v=19$secret".to_string()),
            name: "Alice".to_string(),
            phone: None,
            verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(ProfileResponse::from(user)).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();

        assert!(keys.iter().all(|k| !k.contains("password")));
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["verified"], true);
    }
}
