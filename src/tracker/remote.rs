//! 远端数据源接口

use anyhow::Result;
use async_trait::async_trait;

/// 远端数据源：一次拉取某类实体的全量列表（无分页、无增量 token）
#[async_trait]
pub trait RemoteSource<T>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<T>>;
}
