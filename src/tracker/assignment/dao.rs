//! 作业数据访问层（DAO）
//!
//! 负责 `assignments` 表的全部读写，实现 [`LocalStore`]。

use crate::tracker::assignment::models::Assignment;
use crate::tracker::store::LocalStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, description, due_date, subject, completed, priority
    FROM assignments
"#;

/// 作业表在通用读写之外的专属语句
#[async_trait]
pub trait AssignmentStore: LocalStore<Assignment> {
    /// 未完成的作业，按截止时间升序
    async fn get_pending(&self) -> Result<Vec<Assignment>>;

    /// 只更新 `completed` 列；返回该 id 是否存在
    async fn mark_complete(&self, id: i64) -> Result<bool>;
}

/// 作业 DAO（基于 sqlx）
pub struct AssignmentDao {
    db: Pool<Sqlite>,
}

impl AssignmentDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn from_row(m: &SqliteRow) -> Assignment {
        let completed: i64 = m.get("completed");
        Assignment {
            id: m.get("id"),
            title: m.get("title"),
            description: m.get("description"),
            due_date: m.get("due_date"),
            subject: m.get("subject"),
            completed: completed != 0,
            priority: m.get("priority"),
        }
    }
}

#[async_trait]
impl LocalStore<Assignment> for AssignmentDao {
    async fn get_all(&self) -> Result<Vec<Assignment>> {
        let sql = format!("{} ORDER BY id ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.db)
            .await
            .context("查询作业列表失败")?;

        let assignments: Vec<Assignment> = rows.iter().map(Self::from_row).collect();
        debug!("[AssignmentDAO] 获取本地作业列表，共 {} 条", assignments.len());
        Ok(assignments)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("查询作业失败")?;
        Ok(row.as_ref().map(Self::from_row))
    }

    async fn upsert(&self, a: &Assignment) -> Result<i64> {
        let sql = r#"
            INSERT INTO assignments (
                id, title, description, due_date, subject, completed, priority
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                due_date = excluded.due_date,
                subject = excluded.subject,
                completed = excluded.completed,
                priority = excluded.priority
        "#;

        // id 为 0 时绑定 NULL，由 SQLite 分配新主键
        let result = sqlx::query(sql)
            .bind((a.id != 0).then_some(a.id))
            .bind(&a.title)
            .bind(&a.description)
            .bind(a.due_date)
            .bind(&a.subject)
            .bind(if a.completed { 1 } else { 0 })
            .bind(&a.priority)
            .execute(&self.db)
            .await
            .context("插入或更新作业失败")?;

        let id = if a.id != 0 {
            a.id
        } else {
            result.last_insert_rowid()
        };
        debug!("[AssignmentDAO] upsert 作业 id={}", id);
        Ok(id)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM assignments WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .context("删除作业失败")?;
        Ok(())
    }

    async fn get_upcoming(&self, now_millis: i64) -> Result<Vec<Assignment>> {
        let sql = format!("{} WHERE due_date > ? ORDER BY due_date ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(now_millis)
            .fetch_all(&self.db)
            .await
            .context("查询即将到期作业失败")?;
        Ok(rows.iter().map(Self::from_row).collect())
    }
}

#[async_trait]
impl AssignmentStore for AssignmentDao {
    async fn get_pending(&self) -> Result<Vec<Assignment>> {
        let sql = format!("{} WHERE completed = 0 ORDER BY due_date ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.db)
            .await
            .context("查询未完成作业失败")?;

        let pending: Vec<Assignment> = rows.iter().map(Self::from_row).collect();
        debug!("[AssignmentDAO] 未完成作业 {} 条", pending.len());
        Ok(pending)
    }

    async fn mark_complete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE assignments SET completed = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .context("标记作业完成失败")?;

        debug!(
            "[AssignmentDAO] 标记完成 id={}, 影响行数: {}",
            id,
            result.rows_affected()
        );
        Ok(result.rows_affected() > 0)
    }
}
