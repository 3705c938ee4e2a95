//! 配置数据访问层（DAO）

use crate::tracker::app_config::models::AppConfig;
use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

/// 配置 DAO（基于 sqlx）
pub struct AppConfigDao {
    db: Pool<Sqlite>,
}

impl AppConfigDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// 插入或更新配置，返回生效的 id
    pub async fn upsert(&self, c: &AppConfig) -> Result<i64> {
        let sql = r#"
            INSERT INTO app_config (id, google_sheets_url, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                google_sheets_url = excluded.google_sheets_url,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
        "#;

        let result = sqlx::query(sql)
            .bind((c.id != 0).then_some(c.id))
            .bind(&c.google_sheets_url)
            .bind(c.created_at)
            .bind(c.updated_at)
            .execute(&self.db)
            .await
            .context("保存表格配置失败")?;

        let id = if c.id != 0 {
            c.id
        } else {
            result.last_insert_rowid()
        };
        debug!("[AppConfigDAO] 保存配置 id={}, url={}", id, c.google_sheets_url);
        Ok(id)
    }

    /// 最近更新的一条配置
    pub async fn get_latest(&self) -> Result<Option<AppConfig>> {
        let row = sqlx::query(
            r#"
            SELECT id, google_sheets_url, created_at, updated_at
            FROM app_config
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.db)
        .await
        .context("查询表格配置失败")?;

        let config = row.map(|m| AppConfig {
            id: m.get("id"),
            google_sheets_url: m.get("google_sheets_url"),
            created_at: m.get("created_at"),
            updated_at: m.get("updated_at"),
        });
        debug!(
            "[AppConfigDAO] 最新配置: {:?}",
            config.as_ref().map(|c| c.id)
        );
        Ok(config)
    }
}
