//! 列表界面的状态持有者

use crate::tracker::presentation::scope::ViewScope;
use crate::tracker::presentation::state::{project_state, RepositoryWatch, UiState};
use crate::tracker::repository::SyncRepository;
use crate::tracker::types::TrackedItem;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

/// 把仓库三元状态折叠成 `UiState<Vec<T>>`，构造时即发起一次加载
pub struct ListStateHolder<T: TrackedItem> {
    repository: Arc<SyncRepository<T>>,
    state: watch::Receiver<UiState<Vec<T>>>,
    scope: ViewScope,
}

impl<T: TrackedItem> ListStateHolder<T> {
    /// 必须在 tokio 运行时内调用
    pub fn new(repository: Arc<SyncRepository<T>>) -> Self {
        let (tx, rx) = watch::channel(UiState::Loading);
        let scope = ViewScope::new();
        scope.launch(Self::combine(repository.clone(), tx));

        let holder = Self {
            repository,
            state: rx,
            scope,
        };
        holder.refresh();
        holder
    }

    async fn combine(repository: Arc<SyncRepository<T>>, tx: watch::Sender<UiState<Vec<T>>>) {
        let mut source = RepositoryWatch::new(&repository);
        loop {
            let (items, is_loading, error) = source.snapshot();
            tx.send_replace(project_state(items, is_loading, error));
            if source.changed().await.is_err() {
                debug!("[ListState/{}] 仓库已释放，停止监听", T::KIND);
                break;
            }
        }
    }

    pub fn state(&self) -> watch::Receiver<UiState<Vec<T>>> {
        self.state.clone()
    }

    pub fn current(&self) -> UiState<Vec<T>> {
        self.state.borrow().clone()
    }

    /// 重新执行 `load_all()`（错误界面的重试入口）
    pub fn refresh(&self) {
        let repository = self.repository.clone();
        self.scope.launch(async move { repository.load_all().await });
    }

    pub fn delete_item(&self, id: i64) {
        let repository = self.repository.clone();
        self.scope.launch(async move {
            if let Err(e) = repository.delete(id).await {
                error!("[ListState/{}] 删除 {} 失败: {:#}", T::KIND, id, e);
            }
        });
    }
}
