//! 代码内定义的 SQL 迁移
//!
//! 启动时按版本顺序应用，应用记录连同校验和写入 `_migrations` 表。
//! 校验和不一致说明已应用的迁移被改过，这种情况只报错不重跑。

use std::collections::HashMap;

use gatehouse_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::info;

const TRACKING_TABLE: &str = "_migrations";

/// 一条迁移：版本号、名称和升级 SQL
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub sql: String,
    pub checksum: String,
}

impl Migration {
    pub fn new(version: i64, name: impl Into<String>, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let checksum = checksum_of(&sql);
        Self {
            version,
            name: name.into(),
            sql,
            checksum,
        }
    }
}

fn checksum_of(sql: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    sql.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// 迁移执行器
pub struct MigrationManager {
    pool: PgPool,
}

impl MigrationManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按版本顺序应用全部未应用的迁移
    ///
    /// 任一迁移执行失败即停，不再尝试后续版本。
    pub async fn migrate(&self, migrations: &[Migration]) -> AppResult<MigrationReport> {
        self.ensure_tracking_table().await?;
        let recorded = self.applied_checksums().await?;

        let mut ordered: Vec<&Migration> = migrations.iter().collect();
        ordered.sort_by_key(|m| m.version);

        let mut report = MigrationReport::default();

        for migration in ordered {
            match recorded.get(&migration.version) {
                Some(checksum) if *checksum != migration.checksum => {
                    report.errors.push(MigrationError {
                        version: migration.version,
                        name: migration.name.clone(),
                        error: "Applied migration differs from its recorded checksum".to_string(),
                    });
                }
                Some(_) => report.skipped.push(migration.version),
                None => match self.apply(migration).await {
                    Ok(true) => report.applied.push(migration.version),
                    // 另一个实例抢先应用了同一版本
                    Ok(false) => report.skipped.push(migration.version),
                    Err(e) => {
                        report.errors.push(MigrationError {
                            version: migration.version,
                            name: migration.name.clone(),
                            error: e.to_string(),
                        });
                        break;
                    }
                },
            }
        }

        Ok(report)
    }

    /// 应用单条迁移
    ///
    /// 先在事务内抢占版本行再执行 DDL，并发迁移按版本行串行化。
    /// 返回 false 表示版本行已被占用，本实例什么都没做。
    async fn apply(&self, migration: &Migration) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::store_unavailable(format!("Migration tx failed: {}", e)))?;

        let claim = format!(
            "INSERT INTO {} (version, name, checksum) VALUES ($1, $2, $3) \
             ON CONFLICT (version) DO NOTHING",
            TRACKING_TABLE
        );
        let claimed = sqlx::query(&claim)
            .bind(migration.version)
            .bind(&migration.name)
            .bind(&migration.checksum)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::store_unavailable(format!(
                    "Claiming migration {} failed: {}",
                    migration.version, e
                ))
            })?
            .rows_affected()
            == 1;

        if !claimed {
            return Ok(false);
        }

        sqlx::query(&migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::store_unavailable(format!(
                    "Migration {} ({}) failed: {}",
                    migration.version, migration.name, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| AppError::store_unavailable(format!("Migration commit failed: {}", e)))?;

        info!(version = migration.version, name = %migration.name, "Migration applied");
        Ok(true)
    }

    async fn ensure_tracking_table(&self) -> AppResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                version BIGINT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                checksum VARCHAR(64) NOT NULL
            )",
            TRACKING_TABLE
        );

        sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
            AppError::store_unavailable(format!("Migration table setup failed: {}", e))
        })?;

        Ok(())
    }

    async fn applied_checksums(&self) -> AppResult<HashMap<i64, String>> {
        let sql = format!("SELECT version, checksum FROM {}", TRACKING_TABLE);

        let rows: Vec<(i64, String)> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::store_unavailable(format!("Reading migration table failed: {}", e))
            })?;

        Ok(rows.into_iter().collect())
    }
}

/// 一次迁移运行的结果汇总
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub applied: Vec<i64>,
    pub skipped: Vec<i64>,
    pub errors: Vec<MigrationError>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}

#[derive(Debug, Clone)]
pub struct MigrationError {
    pub version: i64,
    pub name: String,
    pub error: String,
}
