//! 视图作用域：持有由某个界面发起的异步任务，界面销毁时统一取消

use std::future::Future;
use std::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct ViewScope {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在当前 tokio 运行时上启动任务，并登记到作用域
    pub fn launch<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }

    /// 取消所有尚未完成的任务；已写入的状态不做回滚
    pub fn cancel(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel();
    }
}
