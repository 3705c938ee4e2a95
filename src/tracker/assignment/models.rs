//! 作业本地模型定义

use crate::tracker::assignment::dao::AssignmentStore;
use crate::tracker::types::{ItemKind, TrackedItem};
use serde::{Deserialize, Serialize};

/// 作业（远端 JSON 使用 camelCase 字段，缺失字段取默认值）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// 截止时间（毫秒）
    pub due_date: i64,
    pub subject: String,
    pub completed: bool,
    pub priority: String,
}

impl TrackedItem for Assignment {
    const KIND: ItemKind = ItemKind::Assignment;
    type Store = dyn AssignmentStore;

    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn sort_date(&self) -> i64 {
        self.due_date
    }
}
