//! 项目本地模型定义

use crate::tracker::project::dao::ProjectStore;
use crate::tracker::types::{ItemKind, TrackedItem};
use serde::{Deserialize, Serialize};

/// 项目进度上限
pub const MAX_PROGRESS: i32 = 100;

/// 项目
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub start_date: i64,
    pub due_date: i64,
    pub subject: String,
    /// 进度百分比（0..=100）
    pub progress: i32,
    pub completed: bool,
}

impl TrackedItem for Project {
    const KIND: ItemKind = ItemKind::Project;
    type Store = dyn ProjectStore;

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
