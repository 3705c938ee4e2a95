//! 详情界面的状态持有者

use crate::tracker::presentation::scope::ViewScope;
use crate::tracker::presentation::state::UiState;
use crate::tracker::repository::{error_message, SyncRepository};
use crate::tracker::types::TrackedItem;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::error;

pub struct DetailStateHolder<T: TrackedItem> {
    repository: Arc<SyncRepository<T>>,
    tx: Arc<watch::Sender<UiState<T>>>,
    scope: ViewScope,
}

impl<T: TrackedItem> DetailStateHolder<T> {
    pub fn new(repository: Arc<SyncRepository<T>>) -> Self {
        Self {
            repository,
            tx: Arc::new(watch::Sender::new(UiState::Loading)),
            scope: ViewScope::new(),
        }
    }

    pub fn state(&self) -> watch::Receiver<UiState<T>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> UiState<T> {
        self.tx.borrow().clone()
    }

    /// 从本地库读取条目
    pub fn load(&self, id: i64) {
        let repository = self.repository.clone();
        let tx = self.tx.clone();
        self.scope.launch(async move {
            tx.send_replace(UiState::Loading);
            let state = match repository.get_by_id(id).await {
                Ok(Some(item)) => UiState::Success(item),
                Ok(None) => UiState::Error(format!("{} {} 不存在", T::KIND, id)),
                Err(e) => UiState::Error(error_message(&e)),
            };
            tx.send_replace(state);
        });
    }

    pub fn delete(&self, id: i64) {
        let repository = self.repository.clone();
        self.scope.launch(async move {
            if let Err(e) = repository.delete(id).await {
                error!("[DetailState/{}] 删除 {} 失败: {:#}", T::KIND, id, e);
            }
        });
    }
}
