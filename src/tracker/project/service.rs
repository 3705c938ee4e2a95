//! 项目仓库的专属操作

use crate::tracker::project::dao::ProjectStore;
use crate::tracker::project::models::{Project, MAX_PROGRESS};
use crate::tracker::repository::SyncRepository;
use anyhow::Result;
use tracing::{info, warn};

pub type ProjectRepository = SyncRepository<Project>;

impl SyncRepository<Project> {
    /// 更新进度（截断到 0..=100）后完整重载
    pub async fn update_progress(&self, id: i64, progress: i32) -> Result<()> {
        let progress = progress.clamp(0, MAX_PROGRESS);
        if self.store().update_progress(id, progress).await? {
            info!("[Repo/Project] 项目 {} 进度更新为 {}%", id, progress);
        } else {
            warn!("[Repo/Project] 更新进度失败，项目 {} 不存在", id);
        }
        self.load_all().await;
        Ok(())
    }
}
