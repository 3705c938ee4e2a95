//! 项目数据访问层（DAO）

use crate::tracker::project::models::Project;
use crate::tracker::store::LocalStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, description, start_date, due_date, subject, progress, completed
    FROM projects
"#;

/// 项目表的专属语句
#[async_trait]
pub trait ProjectStore: LocalStore<Project> {
    /// 只更新 `progress` 列（调用方负责取值范围）；返回该 id 是否存在
    async fn update_progress(&self, id: i64, progress: i32) -> Result<bool>;
}

/// 项目 DAO（基于 sqlx）
pub struct ProjectDao {
    db: Pool<Sqlite>,
}

impl ProjectDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn from_row(m: &SqliteRow) -> Project {
        let completed: i64 = m.get("completed");
        Project {
            id: m.get("id"),
            title: m.get("title"),
            description: m.get("description"),
            start_date: m.get("start_date"),
            due_date: m.get("due_date"),
            subject: m.get("subject"),
            progress: m.get("progress"),
            completed: completed != 0,
        }
    }
}

#[async_trait]
impl LocalStore<Project> for ProjectDao {
    async fn get_all(&self) -> Result<Vec<Project>> {
        let sql = format!("{} ORDER BY id ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.db)
            .await
            .context("查询项目列表失败")?;

        let projects: Vec<Project> = rows.iter().map(Self::from_row).collect();
        debug!("[ProjectDAO] 获取本地项目列表，共 {} 条", projects.len());
        Ok(projects)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Project>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("查询项目失败")?;
        Ok(row.as_ref().map(Self::from_row))
    }

    async fn upsert(&self, p: &Project) -> Result<i64> {
        let sql = r#"
            INSERT INTO projects (
                id, title, description, start_date, due_date, subject, progress, completed
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                start_date = excluded.start_date,
                due_date = excluded.due_date,
                subject = excluded.subject,
                progress = excluded.progress,
                completed = excluded.completed
        "#;

        let result = sqlx::query(sql)
            .bind((p.id != 0).then_some(p.id))
            .bind(&p.title)
            .bind(&p.description)
            .bind(p.start_date)
            .bind(p.due_date)
            .bind(&p.subject)
            .bind(p.progress)
            .bind(if p.completed { 1 } else { 0 })
            .execute(&self.db)
            .await
            .context("插入或更新项目失败")?;

        Ok(if p.id != 0 {
            p.id
        } else {
            result.last_insert_rowid()
        })
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .context("删除项目失败")?;
        Ok(())
    }

    async fn get_upcoming(&self, now_millis: i64) -> Result<Vec<Project>> {
        let sql = format!("{} WHERE due_date > ? ORDER BY due_date ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(now_millis)
            .fetch_all(&self.db)
            .await
            .context("查询即将到期项目失败")?;
        Ok(rows.iter().map(Self::from_row).collect())
    }
}

#[async_trait]
impl ProjectStore for ProjectDao {
    async fn update_progress(&self, id: i64, progress: i32) -> Result<bool> {
        let result = sqlx::query("UPDATE projects SET progress = ? WHERE id = ?")
            .bind(progress)
            .bind(id)
            .execute(&self.db)
            .await
            .context("更新项目进度失败")?;

        debug!(
            "[ProjectDAO] 更新进度 id={}, progress={}, 影响行数: {}",
            id,
            progress,
            result.rows_affected()
        );
        Ok(result.rows_affected() > 0)
    }
}
