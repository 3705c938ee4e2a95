//! Google Sheets 配置模型

use serde::{Deserialize, Serialize};

/// 一条已保存的表格地址配置；最新一条（updated_at 最大）即当前配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub id: i64,
    pub google_sheets_url: String,
    pub created_at: i64,
    pub updated_at: i64,
}
