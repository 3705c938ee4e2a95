//! 仪表盘的状态持有者：合并三个仓库的状态

use crate::tracker::assignment::AssignmentRepository;
use crate::tracker::exam::ExamRepository;
use crate::tracker::presentation::scope::ViewScope;
use crate::tracker::presentation::state::{RepositoryWatch, UiState};
use crate::tracker::project::ProjectRepository;
use crate::tracker::usecase::{
    DashboardStats, GetDashboardOverviewUseCase, GetUpcomingItemsUseCase, UpcomingItem,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// 仪表盘成功态的数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub upcoming: Vec<UpcomingItem>,
}

const DASHBOARD_FAILED: &str = "仪表盘数据加载失败";

pub struct DashboardStateHolder {
    assignments: Arc<AssignmentRepository>,
    exams: Arc<ExamRepository>,
    projects: Arc<ProjectRepository>,
    state: watch::Receiver<UiState<DashboardView>>,
    scope: ViewScope,
}

impl DashboardStateHolder {
    pub fn new(
        assignments: Arc<AssignmentRepository>,
        exams: Arc<ExamRepository>,
        projects: Arc<ProjectRepository>,
    ) -> Self {
        let (tx, rx) = watch::channel(UiState::Loading);
        let scope = ViewScope::new();
        scope.launch(Self::combine(
            assignments.clone(),
            exams.clone(),
            projects.clone(),
            tx,
        ));

        let holder = Self {
            assignments,
            exams,
            projects,
            state: rx,
            scope,
        };
        holder.refresh();
        holder
    }

    async fn combine(
        assignments: Arc<AssignmentRepository>,
        exams: Arc<ExamRepository>,
        projects: Arc<ProjectRepository>,
        tx: watch::Sender<UiState<DashboardView>>,
    ) {
        let overview =
            GetDashboardOverviewUseCase::new(assignments.clone(), exams.clone(), projects.clone());
        let upcoming_items =
            GetUpcomingItemsUseCase::new(assignments.clone(), exams.clone(), projects.clone());

        let mut a = RepositoryWatch::new(&assignments);
        let mut e = RepositoryWatch::new(&exams);
        let mut p = RepositoryWatch::new(&projects);

        loop {
            let (_, a_loading, a_error) = a.snapshot();
            let (_, e_loading, e_error) = e.snapshot();
            let (_, p_loading, p_error) = p.snapshot();

            let state = if let Some(message) = a_error.or(e_error).or(p_error) {
                UiState::Error(message)
            } else if a_loading || e_loading || p_loading {
                UiState::Loading
            } else {
                match (overview.execute().await, upcoming_items.execute().await) {
                    (Ok(stats), Ok(upcoming)) => UiState::Success(DashboardView { stats, upcoming }),
                    (Err(err), _) | (_, Err(err)) => {
                        warn!("[Dashboard] 统计失败: {:#}", err);
                        UiState::Error(DASHBOARD_FAILED.to_string())
                    }
                }
            };
            tx.send_replace(state);

            let changed = tokio::select! {
                r = a.changed() => r,
                r = e.changed() => r,
                r = p.changed() => r,
            };
            if changed.is_err() {
                debug!("[Dashboard] 仓库已释放，停止监听");
                break;
            }
        }
    }

    pub fn state(&self) -> watch::Receiver<UiState<DashboardView>> {
        self.state.clone()
    }

    pub fn current(&self) -> UiState<DashboardView> {
        self.state.borrow().clone()
    }

    /// 依次重载作业、考试、项目
    pub fn refresh(&self) {
        let assignments = self.assignments.clone();
        let exams = self.exams.clone();
        let projects = self.projects.clone();
        self.scope.launch(async move {
            assignments.load_all().await;
            exams.load_all().await;
            projects.load_all().await;
        });
    }
}
