//! 本地优先的同步仓库（cache-then-refresh）
//!
//! 三类条目共用同一套流程：
//! 1. 置 `is_loading = true`
//! 2. 立即发布本地库全量数据（可能为空或过期）
//! 3. 拉取远端全量数据，逐条 upsert 进本地库，再读一次本地库并发布，清空 `error`；
//!    失败时把错误信息写入 `error`，保留第 2 步已发布的列表
//! 4. 置 `is_loading = false`
//!
//! 两次本地读取之间没有事务隔离，并发的增删可能穿插其中；`items` 以最后完成的写入为准。
//! 任何增删改都会触发一次完整的 `load_all()`，因此每次本地编辑都伴随一次远端请求。

use crate::tracker::remote::RemoteSource;
use crate::tracker::state::RepositoryState;
use crate::tracker::store::LocalStore;
use crate::tracker::types::{now_millis, TrackedItem};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 错误本身没有描述时写入 `error` 的固定文案
pub const UNKNOWN_ERROR: &str = "未知错误";

/// 把错误链渲染成单行文案
pub(crate) fn error_message(e: &anyhow::Error) -> String {
    let message = format!("{:#}", e);
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

/// 某一类条目的同步仓库
pub struct SyncRepository<T: TrackedItem> {
    store: Arc<T::Store>,
    remote: Arc<dyn RemoteSource<T>>,
    state: RepositoryState<T>,
}

impl<T: TrackedItem> SyncRepository<T> {
    pub fn new(store: Arc<T::Store>, remote: Arc<dyn RemoteSource<T>>) -> Self {
        Self {
            store,
            remote,
            state: RepositoryState::new(),
        }
    }

    /// 订阅条目列表
    pub fn items(&self) -> watch::Receiver<Vec<T>> {
        self.state.items.subscribe()
    }

    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.state.is_loading.subscribe()
    }

    pub fn error(&self) -> watch::Receiver<Option<String>> {
        self.state.error.subscribe()
    }

    /// 当前已发布的条目列表快照
    pub fn current_items(&self) -> Vec<T> {
        self.state.items.get()
    }

    pub fn current_error(&self) -> Option<String> {
        self.state.error.get()
    }

    pub(crate) fn store(&self) -> &Arc<T::Store> {
        &self.store
    }

    /// 先发布缓存，再拉取远端并合并；失败只记录到 `error`，从不向调用方返回错误
    pub async fn load_all(&self) {
        let kind = T::KIND;
        self.state.is_loading.set(true);
        info!("[Repo/{}] 🔄 开始加载", kind);

        match self.refresh().await {
            Ok(fetched) => {
                info!("[Repo/{}] ✅ 加载完成，远端条目数: {}", kind, fetched);
            }
            Err(e) => {
                let message = error_message(&e);
                warn!("[Repo/{}] 加载失败，保留缓存数据: {}", kind, message);
                self.state.error.set(Some(message));
            }
        }

        self.state.is_loading.set(false);
    }

    async fn refresh(&self) -> Result<usize> {
        let cached = self.store.get_all().await?;
        debug!("[Repo/{}] 发布缓存数据 {} 条", T::KIND, cached.len());
        self.state.items.set(cached);

        let remote_items = self.remote.fetch_all().await?;
        for item in &remote_items {
            self.store.upsert(item).await?;
        }

        let fresh = self.store.get_all().await?;
        debug!("[Repo/{}] 发布合并后数据 {} 条", T::KIND, fresh.len());
        self.state.items.set(fresh);
        self.state.error.set(None);
        Ok(remote_items.len())
    }

    /// 只查本地库，不触发远端请求
    pub async fn get_by_id(&self, id: i64) -> Result<Option<T>> {
        self.store.get_by_id(id).await
    }

    /// 写入本地库后完整重载，返回条目最终的 id
    pub async fn insert(&self, item: &T) -> Result<i64> {
        let id = self.store.upsert(item).await?;
        info!("[Repo/{}] 保存条目 id={}", T::KIND, id);
        self.load_all().await;
        Ok(id)
    }

    /// 与 `insert` 相同：本地库的 upsert 即按主键更新或插入
    pub async fn update(&self, item: &T) -> Result<i64> {
        self.insert(item).await
    }

    /// 从本地库物理删除后完整重载（删除不会同步到远端）
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_by_id(id).await?;
        info!("[Repo/{}] 删除条目 id={}", T::KIND, id);
        self.load_all().await;
        Ok(())
    }

    /// 日期晚于当前时间的条目（当前时间在调用时采样一次）
    pub async fn get_upcoming(&self) -> Result<Vec<T>> {
        self.get_upcoming_since(now_millis()).await
    }

    pub async fn get_upcoming_since(&self, now_millis: i64) -> Result<Vec<T>> {
        self.store.get_upcoming(now_millis).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::assignment::{Assignment, AssignmentDao, AssignmentStore};
    use crate::tracker::db::create_memory_pool;
    use crate::tracker::test_support::{init_test_logger, FakeBehavior, FakeRemote};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn assignment(id: i64, title: &str) -> Assignment {
        Assignment {
            id,
            title: title.to_string(),
            subject: "Math".to_string(),
            ..Default::default()
        }
    }

    async fn setup(
        remote: FakeRemote<Assignment>,
    ) -> (Arc<SyncRepository<Assignment>>, Arc<AssignmentDao>, Arc<FakeRemote<Assignment>>) {
        init_test_logger();
        let dao = Arc::new(AssignmentDao::new(create_memory_pool().await.unwrap()));
        let remote = Arc::new(remote);
        let repo = Arc::new(SyncRepository::new(
            dao.clone() as Arc<dyn AssignmentStore>,
            remote.clone() as Arc<dyn RemoteSource<Assignment>>,
        ));
        (repo, dao, remote)
    }

    #[tokio::test]
    async fn cached_items_are_published_before_remote_completes() {
        let (repo, dao, remote) = setup(FakeRemote::new(FakeBehavior::Hang)).await;
        for i in 1..=3 {
            dao.upsert(&assignment(i, &format!("cached {}", i))).await.unwrap();
        }

        let mut items = repo.items();
        let task = tokio::spawn({
            let repo = repo.clone();
            async move { repo.load_all().await }
        });

        let published =
            tokio::time::timeout(Duration::from_secs(5), items.wait_for(|v| v.len() == 3))
                .await
                .expect("缓存数据应在远端返回前发布")
                .unwrap()
                .clone();
        assert_eq!(published.len(), 3);
        assert!(*repo.is_loading().borrow());
        assert!(remote.calls() <= 1);

        task.abort();
    }

    #[tokio::test]
    async fn repeated_sync_does_not_duplicate() {
        let (repo, dao, _) = setup(FakeRemote::returning(vec![assignment(1, "Math HW")])).await;

        repo.load_all().await;
        repo.load_all().await;

        let all = dao.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].title, "Math HW");
        assert_eq!(repo.current_items(), all);
        assert!(repo.current_error().is_none());
    }

    #[tokio::test]
    async fn remote_failure_keeps_cached_items() {
        let (repo, dao, _) = setup(FakeRemote::failing("connection refused")).await;
        dao.upsert(&assignment(1, "cached")).await.unwrap();

        repo.load_all().await;

        let error = repo.current_error().expect("应记录错误");
        assert!(error.contains("connection refused"));
        assert_eq!(repo.current_items(), vec![assignment(1, "cached")]);
        assert!(!*repo.is_loading().borrow());
    }

    #[tokio::test]
    async fn success_after_failure_clears_error() {
        let (repo, _, remote) = setup(FakeRemote::failing("timeout")).await;

        repo.load_all().await;
        assert!(repo.current_error().is_some());

        remote.set_behavior(FakeBehavior::Return(vec![assignment(5, "fresh")]));
        repo.load_all().await;
        assert!(repo.current_error().is_none());
        assert_eq!(repo.current_items().len(), 1);
    }

    #[tokio::test]
    async fn insert_triggers_exactly_one_fetch() {
        let (repo, _, remote) = setup(FakeRemote::returning(vec![assignment(1, "remote")])).await;

        let id = repo.insert(&assignment(0, "local")).await.unwrap();

        assert_eq!(remote.calls(), 1);
        let items = repo.current_items();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|a| a.id == id && a.title == "local"));
    }

    #[tokio::test]
    async fn update_overwrites_existing_row() {
        let (repo, _, _) = setup(FakeRemote::returning(vec![])).await;

        let id = repo.insert(&assignment(0, "draft")).await.unwrap();
        let mut edited = repo.get_by_id(id).await.unwrap().unwrap();
        edited.title = "final".to_string();
        repo.update(&edited).await.unwrap();

        assert_eq!(repo.current_items(), vec![edited]);
    }

    #[tokio::test]
    async fn delete_is_local_only_and_reloads() {
        let (repo, dao, remote) = setup(FakeRemote::returning(vec![])).await;
        dao.upsert(&assignment(1, "keep")).await.unwrap();
        dao.upsert(&assignment(2, "drop")).await.unwrap();

        repo.delete(2).await.unwrap();

        assert_eq!(remote.calls(), 1);
        let all = dao.get_all().await.unwrap();
        assert_eq!(all, vec![assignment(1, "keep")]);
        assert_eq!(repo.current_items(), all);
    }

    #[tokio::test]
    async fn delete_reload_restores_rows_the_remote_still_has() {
        let (repo, dao, remote) =
            setup(FakeRemote::returning(vec![assignment(1, "Math HW")])).await;
        repo.load_all().await;
        dao.upsert(&assignment(2, "local only")).await.unwrap();

        repo.delete(1).await.unwrap();
        repo.delete(2).await.unwrap();

        // 删除不会推送到远端；删除后的重载把远端仍有的 id=1 写回本地
        assert_eq!(remote.calls(), 3);
        let all = dao.get_all().await.unwrap();
        assert_eq!(all, vec![assignment(1, "Math HW")]);
        assert_eq!(repo.current_items(), all);
    }

    #[tokio::test]
    async fn delete_between_cache_read_and_reread_is_visible() {
        let gate = Arc::new(Notify::new());
        let (repo, dao, remote) = setup(FakeRemote::new(FakeBehavior::Gate(
            gate.clone(),
            vec![assignment(3, "remote")],
        )))
        .await;
        dao.upsert(&assignment(1, "deleted meanwhile")).await.unwrap();
        dao.upsert(&assignment(2, "kept")).await.unwrap();

        let mut items = repo.items();
        let task = tokio::spawn({
            let repo = repo.clone();
            async move { repo.load_all().await }
        });
        items.wait_for(|v| v.len() == 2).await.unwrap();
        remote.wait_for_calls(1).await;

        // 远端请求挂起期间直接改本地库
        dao.delete_by_id(1).await.unwrap();
        dao.upsert(&assignment(4, "inserted meanwhile")).await.unwrap();

        gate.notify_one();
        task.await.unwrap();

        let ids: Vec<i64> = repo.current_items().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!(repo.current_error().is_none());
        assert!(!*repo.is_loading().borrow());
    }

    #[tokio::test]
    async fn concurrent_loads_last_to_finish_wins() {
        let first_gate = Arc::new(Notify::new());
        let second_gate = Arc::new(Notify::new());
        let (repo, dao, remote) = setup(FakeRemote::new(FakeBehavior::Gate(
            first_gate.clone(),
            vec![assignment(1, "v1")],
        )))
        .await;

        let first = tokio::spawn({
            let repo = repo.clone();
            async move { repo.load_all().await }
        });
        remote.wait_for_calls(1).await;

        remote.set_behavior(FakeBehavior::Gate(
            second_gate.clone(),
            vec![assignment(1, "v2")],
        ));
        let second = tokio::spawn({
            let repo = repo.clone();
            async move { repo.load_all().await }
        });
        remote.wait_for_calls(2).await;

        // 后发起的先完成
        second_gate.notify_one();
        second.await.unwrap();
        assert_eq!(repo.current_items(), vec![assignment(1, "v2")]);

        first_gate.notify_one();
        first.await.unwrap();

        let all = dao.get_all().await.unwrap();
        assert_eq!(all, vec![assignment(1, "v1")]);
        assert_eq!(repo.current_items(), all);
        assert!(!*repo.is_loading().borrow());
    }

    #[tokio::test]
    async fn store_failure_lands_in_error_slot() {
        init_test_logger();
        let pool = create_memory_pool().await.unwrap();
        let remote = Arc::new(FakeRemote::returning(vec![assignment(1, "remote")]));
        let repo = SyncRepository::new(
            Arc::new(AssignmentDao::new(pool.clone())) as Arc<dyn AssignmentStore>,
            remote.clone() as Arc<dyn RemoteSource<Assignment>>,
        );
        pool.close().await;

        repo.load_all().await;

        let error = repo.current_error().expect("本地库失败应写入 error");
        assert!(error.contains("查询作业列表失败"), "error = {}", error);
        assert!(!*repo.is_loading().borrow());
        assert!(repo.current_items().is_empty());
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn get_by_id_never_hits_remote() {
        let (repo, dao, remote) = setup(FakeRemote::new(FakeBehavior::Hang)).await;
        dao.upsert(&assignment(9, "local")).await.unwrap();

        assert_eq!(repo.get_by_id(9).await.unwrap().unwrap().title, "local");
        assert!(repo.get_by_id(10).await.unwrap().is_none());
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn upcoming_uses_strict_boundary() {
        let (repo, dao, _) = setup(FakeRemote::returning(vec![])).await;
        let t = 1_700_000_000_000;
        for (id, due_date) in [(1, t - 1), (2, t + 2), (3, t + 1)] {
            dao.upsert(&Assignment {
                due_date,
                ..assignment(id, "x")
            })
            .await
            .unwrap();
        }

        let upcoming = repo.get_upcoming_since(t).await.unwrap();
        let dates: Vec<i64> = upcoming.iter().map(|a| a.due_date).collect();
        assert_eq!(dates, vec![t + 1, t + 2]);
    }

    #[test]
    fn empty_error_uses_fixed_message() {
        assert_eq!(error_message(&anyhow::anyhow!("")), UNKNOWN_ERROR);
        assert_eq!(error_message(&anyhow::anyhow!("boom")), "boom");
    }
}
