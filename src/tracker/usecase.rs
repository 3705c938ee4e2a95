//! 用例层：对仓库方法的薄封装，外加仪表盘统计与 upcoming 汇总

use crate::tracker::app_config::{AppConfig, AppConfigRepository};
use crate::tracker::assignment::{Assignment, AssignmentRepository};
use crate::tracker::exam::{Exam, ExamRepository};
use crate::tracker::project::{Project, ProjectRepository};
use crate::tracker::repository::SyncRepository;
use crate::tracker::types::{now_millis, ItemKind, TrackedItem};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// 订阅某类条目的列表
pub struct GetItemListUseCase<T: TrackedItem> {
    repository: Arc<SyncRepository<T>>,
}

impl<T: TrackedItem> GetItemListUseCase<T> {
    pub fn new(repository: Arc<SyncRepository<T>>) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> watch::Receiver<Vec<T>> {
        self.repository.items()
    }
}

/// 查看单个条目详情（仅本地）
pub struct ViewItemDetailsUseCase<T: TrackedItem> {
    repository: Arc<SyncRepository<T>>,
}

impl<T: TrackedItem> ViewItemDetailsUseCase<T> {
    pub fn new(repository: Arc<SyncRepository<T>>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: i64) -> Result<Option<T>> {
        self.repository.get_by_id(id).await
    }
}

pub struct MarkAssignmentCompleteUseCase {
    repository: Arc<AssignmentRepository>,
}

impl MarkAssignmentCompleteUseCase {
    pub fn new(repository: Arc<AssignmentRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: i64) -> Result<()> {
        self.repository.mark_complete(id).await
    }
}

pub struct GetCurrentSheetConfigUseCase {
    repository: Arc<AppConfigRepository>,
}

impl GetCurrentSheetConfigUseCase {
    pub fn new(repository: Arc<AppConfigRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<Option<AppConfig>> {
        self.repository.get_current().await
    }
}

pub struct UpdateGoogleSheetUrlUseCase {
    repository: Arc<AppConfigRepository>,
}

impl UpdateGoogleSheetUrlUseCase {
    pub fn new(repository: Arc<AppConfigRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, url: &str) -> Result<AppConfig> {
        self.repository.update_url(url).await
    }
}

pub struct ValidateSheetUrlUseCase {
    repository: Arc<AppConfigRepository>,
}

impl ValidateSheetUrlUseCase {
    pub fn new(repository: Arc<AppConfigRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, url: &str) -> bool {
        self.repository.validate_url(url).await
    }
}

/// 仪表盘统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_assignments: usize,
    pub completed_assignments: usize,
    pub total_exams: usize,
    pub upcoming_exams: usize,
    pub total_projects: usize,
    pub active_projects: usize,
}

/// 汇总三类仓库当前已发布的列表
pub struct GetDashboardOverviewUseCase {
    assignments: Arc<AssignmentRepository>,
    exams: Arc<ExamRepository>,
    projects: Arc<ProjectRepository>,
}

impl GetDashboardOverviewUseCase {
    pub fn new(
        assignments: Arc<AssignmentRepository>,
        exams: Arc<ExamRepository>,
        projects: Arc<ProjectRepository>,
    ) -> Self {
        Self {
            assignments,
            exams,
            projects,
        }
    }

    pub async fn execute(&self) -> Result<DashboardStats> {
        self.execute_at(now_millis()).await
    }

    pub async fn execute_at(&self, now_millis: i64) -> Result<DashboardStats> {
        let assignments: Vec<Assignment> = self.assignments.current_items();
        let exams: Vec<Exam> = self.exams.current_items();
        let projects: Vec<Project> = self.projects.current_items();

        Ok(DashboardStats {
            total_assignments: assignments.len(),
            completed_assignments: assignments.iter().filter(|a| a.completed).count(),
            total_exams: exams.len(),
            upcoming_exams: self.exams.get_upcoming_since(now_millis).await?.len(),
            total_projects: projects.len(),
            active_projects: projects.iter().filter(|p| !p.completed).count(),
        })
    }
}

/// 仪表盘上的一条待办
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingItem {
    pub id: i64,
    pub title: String,
    pub kind: ItemKind,
    /// 截止/考试时间（毫秒）
    pub date: i64,
}

impl UpcomingItem {
    fn from_item<T: TrackedItem>(item: &T) -> Self {
        Self {
            id: item.id(),
            title: item.title().to_string(),
            kind: T::KIND,
            date: item.sort_date(),
        }
    }
}

/// 合并三类条目的 upcoming 查询，按日期升序
pub struct GetUpcomingItemsUseCase {
    assignments: Arc<AssignmentRepository>,
    exams: Arc<ExamRepository>,
    projects: Arc<ProjectRepository>,
}

impl GetUpcomingItemsUseCase {
    pub fn new(
        assignments: Arc<AssignmentRepository>,
        exams: Arc<ExamRepository>,
        projects: Arc<ProjectRepository>,
    ) -> Self {
        Self {
            assignments,
            exams,
            projects,
        }
    }

    pub async fn execute(&self) -> Result<Vec<UpcomingItem>> {
        self.execute_at(now_millis()).await
    }

    pub async fn execute_at(&self, now_millis: i64) -> Result<Vec<UpcomingItem>> {
        let mut items: Vec<UpcomingItem> = Vec::new();
        items.extend(
            self.assignments
                .get_upcoming_since(now_millis)
                .await?
                .iter()
                .map(UpcomingItem::from_item),
        );
        items.extend(
            self.exams
                .get_upcoming_since(now_millis)
                .await?
                .iter()
                .map(UpcomingItem::from_item),
        );
        items.extend(
            self.projects
                .get_upcoming_since(now_millis)
                .await?
                .iter()
                .map(UpcomingItem::from_item),
        );
        // 稳定排序：同一时间按作业、考试、项目的顺序
        items.sort_by_key(|item| item.date);
        Ok(items)
    }
}
