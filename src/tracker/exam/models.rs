//! 考试本地模型定义

use crate::tracker::store::LocalStore;
use crate::tracker::types::{ItemKind, TrackedItem};
use serde::{Deserialize, Serialize};

/// 考试
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Exam {
    pub id: i64,
    pub title: String,
    pub subject: String,
    /// 考试时间（毫秒）
    pub exam_date: i64,
    pub description: String,
    /// 是否已准备好
    pub preparation_status: bool,
}

impl TrackedItem for Exam {
    const KIND: ItemKind = ItemKind::Exam;
    type Store = dyn LocalStore<Exam>;

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn sort_date(&self) -> i64 {
        self.exam_date
    }
}
