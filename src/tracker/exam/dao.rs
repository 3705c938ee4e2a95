//! 考试数据访问层（DAO）

use crate::tracker::exam::models::Exam;
use crate::tracker::store::LocalStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, subject, exam_date, description, preparation_status
    FROM exams
"#;

/// 考试 DAO（基于 sqlx）
pub struct ExamDao {
    db: Pool<Sqlite>,
}

impl ExamDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    fn from_row(m: &SqliteRow) -> Exam {
        let preparation_status: i64 = m.get("preparation_status");
        Exam {
            id: m.get("id"),
            title: m.get("title"),
            subject: m.get("subject"),
            exam_date: m.get("exam_date"),
            description: m.get("description"),
            preparation_status: preparation_status != 0,
        }
    }
}

#[async_trait]
impl LocalStore<Exam> for ExamDao {
    async fn get_all(&self) -> Result<Vec<Exam>> {
        let sql = format!("{} ORDER BY id ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.db)
            .await
            .context("查询考试列表失败")?;

        let exams: Vec<Exam> = rows.iter().map(Self::from_row).collect();
        debug!("[ExamDAO] 获取本地考试列表，共 {} 条", exams.len());
        Ok(exams)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Exam>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("查询考试失败")?;
        Ok(row.as_ref().map(Self::from_row))
    }

    async fn upsert(&self, e: &Exam) -> Result<i64> {
        let sql = r#"
            INSERT INTO exams (
                id, title, subject, exam_date, description, preparation_status
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                subject = excluded.subject,
                exam_date = excluded.exam_date,
                description = excluded.description,
                preparation_status = excluded.preparation_status
        "#;

        let result = sqlx::query(sql)
            .bind((e.id != 0).then_some(e.id))
            .bind(&e.title)
            .bind(&e.subject)
            .bind(e.exam_date)
            .bind(&e.description)
            .bind(if e.preparation_status { 1 } else { 0 })
            .execute(&self.db)
            .await
            .context("插入或更新考试失败")?;

        Ok(if e.id != 0 {
            e.id
        } else {
            result.last_insert_rowid()
        })
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM exams WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .context("删除考试失败")?;
        Ok(())
    }

    async fn get_upcoming(&self, now_millis: i64) -> Result<Vec<Exam>> {
        let sql = format!("{} WHERE exam_date > ? ORDER BY exam_date ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql)
            .bind(now_millis)
            .fetch_all(&self.db)
            .await
            .context("查询即将到来的考试失败")?;
        Ok(rows.iter().map(Self::from_row).collect())
    }
}
