//! 表格地址配置仓库

use crate::tracker::app_config::dao::AppConfigDao;
use crate::tracker::app_config::models::AppConfig;
use crate::tracker::sheets::SheetsApi;
use crate::tracker::types::now_millis;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::info;

/// 负责保存/读取 Google Sheets 脚本地址，并让远端数据源跟随最新配置
pub struct AppConfigRepository {
    dao: AppConfigDao,
    api: Arc<SheetsApi>,
}

impl AppConfigRepository {
    pub fn new(dao: AppConfigDao, api: Arc<SheetsApi>) -> Self {
        Self { dao, api }
    }

    /// 当前（最近更新的）配置
    pub async fn get_current(&self) -> Result<Option<AppConfig>> {
        self.dao.get_latest().await
    }

    /// 保存新地址并立即切换远端数据源
    pub async fn update_url(&self, url: &str) -> Result<AppConfig> {
        let url = url.trim();
        if url.is_empty() {
            return Err(anyhow!("表格地址不能为空"));
        }

        let now = now_millis();
        let mut config = AppConfig {
            id: 0,
            google_sheets_url: url.to_string(),
            created_at: now,
            updated_at: now,
        };
        config.id = self.dao.upsert(&config).await?;
        self.api.set_script_url(config.google_sheets_url.clone());

        info!("[AppConfig] ✅ 已保存表格地址 id={}", config.id);
        Ok(config)
    }

    /// 地址是否可达；网络错误一律视为不可用
    pub async fn validate_url(&self, url: &str) -> bool {
        self.api.validate_connection(url).await
    }
}
