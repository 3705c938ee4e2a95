//! 本地存储接口
//!
//! 每个实体一张表，以整数 id 为主键。由 sqlx DAO 实现，仓库层只依赖此 trait。

use anyhow::Result;
use async_trait::async_trait;

/// 本地存储（单实体表）
#[async_trait]
pub trait LocalStore<T>: Send + Sync {
    /// 读取整张表
    async fn get_all(&self) -> Result<Vec<T>>;

    /// 按主键查询
    async fn get_by_id(&self, id: i64) -> Result<Option<T>>;

    /// 按主键插入或更新，返回最终生效的 id（`id == 0` 时由库分配）
    async fn upsert(&self, item: &T) -> Result<i64>;

    /// 按主键物理删除；id 不存在时不报错
    async fn delete_by_id(&self, id: i64) -> Result<()>;

    /// 日期字段严格大于 `now_millis` 的条目，按日期升序
    async fn get_upcoming(&self, now_millis: i64) -> Result<Vec<T>>;
}
