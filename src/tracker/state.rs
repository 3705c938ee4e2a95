//! 响应式状态容器
//!
//! 基于 `tokio::sync::watch`：保留最新值，新订阅者立即可读，已有订阅者在变更时被唤醒。

use tokio::sync::watch;

/// 可观察的值（replay-latest，多订阅者）
#[derive(Debug)]
pub struct ReactiveValue<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> ReactiveValue<T> {
    pub fn new(initial: T) -> Self {
        Self {
            tx: watch::Sender::new(initial),
        }
    }

    /// 当前值的拷贝
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// 替换当前值并通知所有订阅者（没有订阅者时同样生效）
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

/// 仓库对外暴露的三元状态：条目列表、加载标记、最近一次错误
#[derive(Debug)]
pub struct RepositoryState<T> {
    pub items: ReactiveValue<Vec<T>>,
    pub is_loading: ReactiveValue<bool>,
    pub error: ReactiveValue<Option<String>>,
}

impl<T: Clone> RepositoryState<T> {
    pub fn new() -> Self {
        Self {
            items: ReactiveValue::new(Vec::new()),
            is_loading: ReactiveValue::new(false),
            error: ReactiveValue::new(None),
        }
    }
}

impl<T: Clone> Default for RepositoryState<T> {
    fn default() -> Self {
        Self::new()
    }
}
