//! 客户端装配：启动时一次性创建连接池、远端数据源和全部仓库（显式构造，无服务定位器）

use crate::tracker::app_config::{AppConfigDao, AppConfigRepository};
use crate::tracker::assignment::{
    Assignment, AssignmentDao, AssignmentRepository, AssignmentStore,
};
use crate::tracker::db::{create_memory_pool, create_sqlite_pool_with_migration};
use crate::tracker::exam::{Exam, ExamDao, ExamRepository};
use crate::tracker::presentation::{DashboardStateHolder, DetailStateHolder, ListStateHolder};
use crate::tracker::project::{Project, ProjectDao, ProjectRepository, ProjectStore};
use crate::tracker::remote::RemoteSource;
use crate::tracker::repository::SyncRepository;
use crate::tracker::sheets::{SheetsApi, SheetsApiConfig};
use crate::tracker::store::LocalStore;
use crate::tracker::types::ItemKind;
use crate::tracker::usecase::{GetDashboardOverviewUseCase, GetUpcomingItemsUseCase};
use anyhow::Result;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 内存数据库 URL
pub const MEMORY_DB_URL: &str = "sqlite::memory:";

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// 本地 SQLite 数据库 URL，例如 `sqlite://tracker.db?mode=rwc`
    pub db_url: String,
    /// Google Sheets 脚本地址；为空时使用库中最近保存的配置
    pub script_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// 服务端 5xx 自动重试次数
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new(db_url: String) -> Self {
        let api = SheetsApiConfig::default();
        Self {
            db_url,
            script_url: String::new(),
            connect_timeout: api.connect_timeout,
            request_timeout: api.request_timeout,
            max_retries: api.max_retries,
            retry_base_delay: api.retry_base_delay,
        }
    }

    fn api_config(&self) -> SheetsApiConfig {
        SheetsApiConfig {
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            max_retries: self.max_retries,
            retry_base_delay: self.retry_base_delay,
        }
    }
}

/// 学习任务跟踪客户端
#[derive(Clone)]
pub struct TrackerClient {
    config: ClientConfig,
    api: Arc<SheetsApi>,
    assignments: Arc<AssignmentRepository>,
    exams: Arc<ExamRepository>,
    projects: Arc<ProjectRepository>,
    app_config: Arc<AppConfigRepository>,
}

impl TrackerClient {
    /// 按配置打开数据库（执行迁移）并装配所有组件
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let db = if config.db_url == MEMORY_DB_URL {
            create_memory_pool().await?
        } else {
            create_sqlite_pool_with_migration(&config.db_url).await?
        };
        Self::with_pool(config, db).await
    }

    /// 使用已有连接池装配
    pub async fn with_pool(config: ClientConfig, db: Pool<Sqlite>) -> Result<Self> {
        let api = Arc::new(SheetsApi::new(config.script_url.clone(), &config.api_config())?);

        let assignments = Arc::new(SyncRepository::new(
            Arc::new(AssignmentDao::new(db.clone())) as Arc<dyn AssignmentStore>,
            api.clone() as Arc<dyn RemoteSource<Assignment>>,
        ));
        let exams = Arc::new(SyncRepository::new(
            Arc::new(ExamDao::new(db.clone())) as Arc<dyn LocalStore<Exam>>,
            api.clone() as Arc<dyn RemoteSource<Exam>>,
        ));
        let projects = Arc::new(SyncRepository::new(
            Arc::new(ProjectDao::new(db.clone())) as Arc<dyn ProjectStore>,
            api.clone() as Arc<dyn RemoteSource<Project>>,
        ));
        let app_config = Arc::new(AppConfigRepository::new(AppConfigDao::new(db), api.clone()));

        if config.script_url.trim().is_empty() {
            if let Some(saved) = app_config.get_current().await? {
                info!("[Client] 使用已保存的表格地址: {}", saved.google_sheets_url);
                api.set_script_url(saved.google_sheets_url);
            } else {
                info!("[Client] 尚未配置表格地址，仅使用本地数据");
            }
        }

        Ok(Self {
            config,
            api,
            assignments,
            exams,
            projects,
            app_config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 当前生效的脚本地址
    pub fn script_url(&self) -> String {
        self.api.script_url()
    }

    pub fn assignments(&self) -> Arc<AssignmentRepository> {
        self.assignments.clone()
    }

    pub fn exams(&self) -> Arc<ExamRepository> {
        self.exams.clone()
    }

    pub fn projects(&self) -> Arc<ProjectRepository> {
        self.projects.clone()
    }

    pub fn app_config(&self) -> Arc<AppConfigRepository> {
        self.app_config.clone()
    }

    /// 并发重载三类条目，返回各自的错误（没有错误时为空）
    pub async fn sync_all(&self) -> Vec<(ItemKind, String)> {
        tokio::join!(
            self.assignments.load_all(),
            self.exams.load_all(),
            self.projects.load_all()
        );

        [
            (ItemKind::Assignment, self.assignments.current_error()),
            (ItemKind::Exam, self.exams.current_error()),
            (ItemKind::Project, self.projects.current_error()),
        ]
        .into_iter()
        .filter_map(|(kind, error)| error.map(|e| (kind, e)))
        .collect()
    }

    pub fn dashboard_overview(&self) -> GetDashboardOverviewUseCase {
        GetDashboardOverviewUseCase::new(
            self.assignments.clone(),
            self.exams.clone(),
            self.projects.clone(),
        )
    }

    pub fn upcoming_items(&self) -> GetUpcomingItemsUseCase {
        GetUpcomingItemsUseCase::new(
            self.assignments.clone(),
            self.exams.clone(),
            self.projects.clone(),
        )
    }

    pub fn assignment_list(&self) -> ListStateHolder<Assignment> {
        ListStateHolder::new(self.assignments.clone())
    }

    pub fn exam_list(&self) -> ListStateHolder<Exam> {
        ListStateHolder::new(self.exams.clone())
    }

    pub fn project_list(&self) -> ListStateHolder<Project> {
        ListStateHolder::new(self.projects.clone())
    }

    pub fn assignment_detail(&self) -> DetailStateHolder<Assignment> {
        DetailStateHolder::new(self.assignments.clone())
    }

    pub fn exam_detail(&self) -> DetailStateHolder<Exam> {
        DetailStateHolder::new(self.exams.clone())
    }

    pub fn project_detail(&self) -> DetailStateHolder<Project> {
        DetailStateHolder::new(self.projects.clone())
    }

    pub fn dashboard(&self) -> DashboardStateHolder {
        DashboardStateHolder::new(
            self.assignments.clone(),
            self.exams.clone(),
            self.projects.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::test_support::init_test_logger;

    #[tokio::test]
    async fn saved_url_is_applied_on_startup() -> Result<()> {
        init_test_logger();
        let db = create_memory_pool().await?;
        let config = ClientConfig::new(MEMORY_DB_URL.to_string());

        let first = TrackerClient::with_pool(config.clone(), db.clone()).await?;
        assert_eq!(first.script_url(), "");
        first
            .app_config()
            .update_url("https://script.google.com/macros/s/abc/exec")
            .await?;

        let second = TrackerClient::with_pool(config, db).await?;
        assert_eq!(second.script_url(), "https://script.google.com/macros/s/abc/exec");
        Ok(())
    }

    #[tokio::test]
    async fn explicit_url_takes_precedence() -> Result<()> {
        let db = create_memory_pool().await?;
        AppConfigRepository::new(
            AppConfigDao::new(db.clone()),
            Arc::new(SheetsApi::new(String::new(), &SheetsApiConfig::default())?),
        )
        .update_url("https://saved.example/exec")
        .await?;

        let mut config = ClientConfig::new(MEMORY_DB_URL.to_string());
        config.script_url = "https://flag.example/exec".to_string();
        let client = TrackerClient::with_pool(config, db).await?;
        assert_eq!(client.script_url(), "https://flag.example/exec");
        Ok(())
    }

    #[tokio::test]
    async fn sync_without_url_reports_errors_but_keeps_local_data() -> Result<()> {
        let client = TrackerClient::connect(ClientConfig::new(MEMORY_DB_URL.to_string())).await?;
        client
            .exams()
            .insert(&Exam {
                title: "Chemistry".into(),
                ..Default::default()
            })
            .await?;

        let errors = client.sync_all().await;
        assert_eq!(errors.len(), 3);
        assert_eq!(client.exams().current_items().len(), 1);
        Ok(())
    }
}
