//! 单测公共工具：日志初始化与可编排的假远端

use crate::tracker::remote::RemoteSource;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Notify;

static INIT_LOGGER: Once = Once::new();

pub(crate) fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::EnvFilter;

        let filter_layer = EnvFilter::new("info,study_tracker_core=debug,sqlx=warn");

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_test_writer();

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    });
}

/// 假远端的行为
#[derive(Clone)]
pub(crate) enum FakeBehavior<T> {
    Return(Vec<T>),
    Fail(String),
    /// 永不返回，用于模拟网络挂起
    Hang,
    /// 等到 `Notify` 放行后返回给定列表
    Gate(Arc<Notify>, Vec<T>),
}

/// 记录调用次数的假远端
pub(crate) struct FakeRemote<T> {
    behavior: Mutex<FakeBehavior<T>>,
    calls: AtomicUsize,
}

impl<T: Clone> FakeRemote<T> {
    pub(crate) fn new(behavior: FakeBehavior<T>) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn returning(items: Vec<T>) -> Self {
        Self::new(FakeBehavior::Return(items))
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self::new(FakeBehavior::Fail(message.to_string()))
    }

    pub(crate) fn set_behavior(&self, behavior: FakeBehavior<T>) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 等待累计调用次数达到 `n`
    pub(crate) async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while self.calls() < n {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("远端调用次数未达到预期");
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> RemoteSource<T> for FakeRemote<T> {
    async fn fetch_all(&self) -> Result<Vec<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            FakeBehavior::Return(items) => Ok(items),
            FakeBehavior::Fail(message) => Err(anyhow!(message)),
            FakeBehavior::Hang => std::future::pending().await,
            FakeBehavior::Gate(gate, items) => {
                gate.notified().await;
                Ok(items)
            }
        }
    }
}
