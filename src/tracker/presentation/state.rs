//! 界面状态投影

use crate::tracker::repository::SyncRepository;
use crate::tracker::types::TrackedItem;
use tokio::sync::watch;

/// 界面三态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> UiState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }
}

/// 错误优先于加载，加载优先于成功。
///
/// 后台刷新失败时即使仓库仍持有有效缓存，这里也会投影为 `Error`，由界面提供重试入口。
pub fn project_state<T>(items: T, is_loading: bool, error: Option<String>) -> UiState<T> {
    match error {
        Some(message) => UiState::Error(message),
        None if is_loading => UiState::Loading,
        None => UiState::Success(items),
    }
}

/// 同时监听一个仓库的三个响应式字段
pub(crate) struct RepositoryWatch<T> {
    items: watch::Receiver<Vec<T>>,
    is_loading: watch::Receiver<bool>,
    error: watch::Receiver<Option<String>>,
}

impl<T: TrackedItem> RepositoryWatch<T> {
    pub(crate) fn new(repository: &SyncRepository<T>) -> Self {
        Self {
            items: repository.items(),
            is_loading: repository.is_loading(),
            error: repository.error(),
        }
    }

    /// 读取三个字段的最新值并标记为已读
    pub(crate) fn snapshot(&mut self) -> (Vec<T>, bool, Option<String>) {
        let items = self.items.borrow_and_update().clone();
        let is_loading = *self.is_loading.borrow_and_update();
        let error = self.error.borrow_and_update().clone();
        (items, is_loading, error)
    }

    /// 任一字段变化时返回；仓库被销毁时返回错误
    pub(crate) async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        tokio::select! {
            r = self.items.changed() => r,
            r = self.is_loading.changed() => r,
            r = self.error.changed() => r,
        }
    }
}
