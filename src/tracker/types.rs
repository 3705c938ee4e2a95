//! 跨实体共享的基础类型

use crate::tracker::store::LocalStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 跟踪条目的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum ItemKind {
    Assignment,
    Exam,
    Project,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Assignment => "Assignment",
            ItemKind::Exam => "Exam",
            ItemKind::Project => "Project",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 可被本地库持久化、被仓库同步的条目
///
/// `id == 0` 表示尚未保存，由本地库在 upsert 时分配主键。
pub trait TrackedItem: Clone + Send + Sync + 'static {
    const KIND: ItemKind;

    /// 仓库持有的本地库类型；带专属查询的实体在 `LocalStore` 之上扩展自己的 trait
    type Store: LocalStore<Self> + ?Sized + Send + Sync + 'static;

    fn id(&self) -> i64;

    fn title(&self) -> &str;

    /// upcoming 查询所依据的日期字段（毫秒时间戳）
    fn sort_date(&self) -> i64;
}

/// 当前系统时间（毫秒时间戳）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
