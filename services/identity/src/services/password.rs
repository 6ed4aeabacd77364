//! 密码哈希服务
//!
//! Argon2id 加盐哈希，成本参数来自配置。校验走 argon2 的
//! 恒定时间验证器，绝不对哈希串或明文做直接字符串比较。

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng},
};
use gatehouse_config::HashingConfig;
use gatehouse_errors::{AppError, AppResult};

use crate::domain::value_objects::HashedPassword;

/// 密码哈希服务
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// 用配置的成本参数创建哈希服务
    ///
    /// 参数非法属于启动期配置错误。
    pub fn new(config: &HashingConfig) -> AppResult<Self> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::hashing_failure(format!("Invalid hashing params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 哈希明文密码
    pub fn hash(&self, plain: &str) -> AppResult<HashedPassword> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| AppError::hashing_failure(format!("Password hashing failed: {}", e)))?;

        Ok(HashedPassword(hash.to_string()))
    }

    /// 校验明文密码是否匹配哈希
    ///
    /// 不匹配返回 Ok(false)，哈希串本身损坏才返回错误。
    pub fn verify(&self, plain: &str, hash: &HashedPassword) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash.as_str())
            .map_err(|e| AppError::hashing_failure(format!("Invalid password hash: {}", e)))?;

        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}
