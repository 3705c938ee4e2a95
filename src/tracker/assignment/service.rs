//! 作业仓库的专属操作

use crate::tracker::assignment::dao::AssignmentStore;
use crate::tracker::assignment::models::Assignment;
use crate::tracker::repository::SyncRepository;
use anyhow::Result;
use tracing::{info, warn};

pub type AssignmentRepository = SyncRepository<Assignment>;

impl SyncRepository<Assignment> {
    /// 标记完成后完整重载；id 不存在时不修改本地库，但仍会重载
    pub async fn mark_complete(&self, id: i64) -> Result<()> {
        if self.store().mark_complete(id).await? {
            info!("[Repo/Assignment] 作业 {} 已标记完成", id);
        } else {
            warn!("[Repo/Assignment] 标记完成失败，作业 {} 不存在", id);
        }
        self.load_all().await;
        Ok(())
    }

    /// 未完成的作业，按截止时间升序（仅本地）
    pub async fn get_pending(&self) -> Result<Vec<Assignment>> {
        self.store().get_pending().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::assignment::AssignmentDao;
    use crate::tracker::db::create_memory_pool;
    use crate::tracker::remote::RemoteSource;
    use crate::tracker::store::LocalStore;
    use crate::tracker::test_support::FakeRemote;
    use std::sync::Arc;

    async fn repo_with(items: Vec<Assignment>) -> (AssignmentRepository, Arc<FakeRemote<Assignment>>) {
        let dao = Arc::new(AssignmentDao::new(create_memory_pool().await.unwrap()));
        for item in &items {
            dao.upsert(item).await.unwrap();
        }
        let remote = Arc::new(FakeRemote::returning(Vec::new()));
        let repo = SyncRepository::new(
            dao as Arc<dyn AssignmentStore>,
            remote.clone() as Arc<dyn RemoteSource<Assignment>>,
        );
        (repo, remote)
    }

    #[tokio::test]
    async fn mark_complete_sets_flag_and_reloads() {
        let (repo, remote) = repo_with(vec![Assignment {
            id: 3,
            title: "Lab report".into(),
            ..Default::default()
        }])
        .await;

        repo.mark_complete(3).await.unwrap();

        assert!(repo.get_by_id(3).await.unwrap().unwrap().completed);
        assert!(repo.current_items()[0].completed);
        assert_eq!(remote.calls(), 1);

        // 不存在的 id 也会重载
        repo.mark_complete(99).await.unwrap();
        assert_eq!(remote.calls(), 2);
    }

    #[tokio::test]
    async fn pending_sorted_by_due_date() {
        let (repo, _) = repo_with(vec![
            Assignment { id: 1, due_date: 30, ..Default::default() },
            Assignment { id: 2, due_date: 10, completed: true, ..Default::default() },
            Assignment { id: 3, due_date: 20, ..Default::default() },
        ])
        .await;

        let ids: Vec<i64> = repo.get_pending().await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
