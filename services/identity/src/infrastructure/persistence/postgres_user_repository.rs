//! PostgreSQL 用户仓储实现

use async_trait::async_trait;
use gatehouse_common::UserId;
use gatehouse_errors::{AppError, AppResult};
use sqlx::PgPool;

use crate::domain::repositories::UserRepository;
use crate::domain::user::{NewUser, User};
use crate::domain::value_objects::{Email, HashedPassword};

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password_hash, name, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, name, phone, verified, created_at, updated_at
            "#,
        )
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(&user.name)
        .bind(&user.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(map_create_error)?;

        row.into_user().map_err(AppError::internal)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, name, phone, verified, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::store_unavailable(format!("Failed to find user: {}", e)))?;

        match row {
            Some(r) => Ok(Some(r.into_user().map_err(AppError::internal)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, name, phone, verified, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::store_unavailable(format!("Failed to find user: {}", e)))?;

        match row {
            Some(r) => Ok(Some(r.into_user().map_err(AppError::internal)?)),
            None => Ok(None),
        }
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::store_unavailable(format!("Failed to check email: {}", e)))?;

        Ok(result.0)
    }

    async fn exists_by_phone(&self, phone: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)")
                .bind(phone)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::store_unavailable(format!("Failed to check phone: {}", e)))?;

        Ok(result.0)
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $2, password_hash = $3, name = $4, phone = $5,
                verified = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id.value())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(&user.name)
        .bind(&user.phone)
        .bind(user.verified)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_update_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }

        Ok(())
    }

    async fn set_verified(&self, email: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET verified = TRUE, updated_at = NOW() WHERE email = $1")
                .bind(email)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::store_unavailable(format!("Failed to mark user verified: {}", e))
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }

        Ok(())
    }
}

/// 唯一约束冲突是并发注册的最终裁决，映射为 DuplicateIdentity
fn map_create_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return match db.constraint() {
                Some("users_phone_key") => {
                    AppError::duplicate_identity("Phone number already registered")
                }
                _ => AppError::duplicate_identity("Email already registered"),
            };
        }
    }
    AppError::store_unavailable(format!("Failed to create user: {}", e))
}

fn map_update_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return AppError::duplicate_identity("Phone number already registered");
        }
    }
    AppError::store_unavailable(format!("Failed to update user: {}", e))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    name: String,
    phone: Option<String>,
    verified: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, String> {
        let email =
            Email::new(&self.email).map_err(|e| format!("Corrupt email in users row: {}", e))?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            password_hash: HashedPassword::from_hash(self.password_hash),
            name: self.name,
            phone: self.phone,
            verified: self.verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
