//! Google Sheets 脚本 HTTP 客户端
//!
//! 负责三类条目的全量拉取与连接校验。5xx 时自动重试（默认一次），超时由底层 reqwest 客户端控制。

use crate::tracker::assignment::Assignment;
use crate::tracker::exam::Exam;
use crate::tracker::project::Project;
use crate::tracker::remote::RemoteSource;
use crate::tracker::sheets::types::{parse_list, SheetAction};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// HTTP 客户端参数
#[derive(Debug, Clone)]
pub struct SheetsApiConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// 服务端 5xx 时的自动重试次数
    pub max_retries: u32,
    /// 首次重试前的等待时间，之后每次翻倍
    pub retry_base_delay: Duration,
}

impl Default for SheetsApiConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(120),
            max_retries: 1,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// Google Sheets 脚本客户端
pub struct SheetsApi {
    client: reqwest::Client,
    /// 脚本地址，可在运行时由配置页更新
    script_url: RwLock<String>,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl SheetsApi {
    pub fn new(script_url: String, config: &SheetsApiConfig) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .context("创建 HTTP 客户端失败")?;

        Ok(Self {
            client,
            script_url: RwLock::new(script_url),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    pub fn script_url(&self) -> String {
        match self.script_url.read() {
            Ok(url) => url.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_script_url(&self, url: String) {
        info!("[SheetsAPI] 切换脚本地址: {}", url);
        match self.script_url.write() {
            Ok(mut guard) => *guard = url,
            Err(poisoned) => *poisoned.into_inner() = url,
        }
    }

    /// 发送 GET 请求，5xx 时按指数退避重试；返回最终的状态码与响应体
    async fn get_with_retry(
        &self,
        base_url: &str,
        action: SheetAction,
    ) -> Result<(reqwest::StatusCode, Vec<u8>)> {
        let operation_id = Uuid::new_v4().to_string();
        let mut attempt: u32 = 0;

        loop {
            debug!(
                "[SheetsAPI]   请求URL: {}?action={}, 操作ID: {}, 第 {} 次尝试",
                base_url,
                action.as_str(),
                operation_id,
                attempt + 1
            );

            let mut request = self
                .client
                .get(base_url)
                .query(&[("action", action.as_str())])
                .header("operationID", &operation_id);
            if attempt > 0 {
                request = request.header("x-retry-count", attempt.to_string());
            }

            let response = request.send().await.context("请求失败")?;
            let status = response.status();

            if status.is_server_error() && attempt < self.max_retries {
                attempt += 1;
                let delay = self.retry_base_delay * 2u32.saturating_pow(attempt - 1);
                warn!(
                    "[SheetsAPI] 服务端错误 {}，{:?} 后重试（{}/{}）",
                    status, delay, attempt, self.max_retries
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let body = response.bytes().await.context("读取响应 body 失败")?;
            return Ok((status, body.to_vec()));
        }
    }

    /// 拉取某个 action 对应的全量列表
    pub async fn fetch_list<T: DeserializeOwned>(&self, action: SheetAction) -> Result<Vec<T>> {
        let base_url = self.script_url();
        if base_url.trim().is_empty() {
            return Err(anyhow!("尚未配置 Google Sheets 脚本地址"));
        }

        info!("[SheetsAPI] 📡 请求 {}", action.as_str());
        let (status, body) = self.get_with_retry(&base_url, action).await?;
        let body_str = String::from_utf8_lossy(&body);

        if !status.is_success() {
            error!(
                "[SheetsAPI] {} 请求失败，HTTP状态: {}, 响应: {}",
                action.as_str(),
                status,
                body_str
            );
            return Err(anyhow!("HTTP 错误 {}: {}", status, body_str));
        }

        let items = parse_list::<T>(&body).map_err(|e| {
            error!(
                "[SheetsAPI] {} 解析失败: {:?}\n原始响应: {}",
                action.as_str(),
                e,
                body_str
            );
            e
        })?;

        info!("[SheetsAPI] ✅ {} 响应，条目数: {}", action.as_str(), items.len());
        Ok(items)
    }

    pub async fn fetch_assignments(&self) -> Result<Vec<Assignment>> {
        self.fetch_list(SheetAction::GetAssignments).await
    }

    pub async fn fetch_exams(&self) -> Result<Vec<Exam>> {
        self.fetch_list(SheetAction::GetExams).await
    }

    pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.fetch_list(SheetAction::GetProjects).await
    }

    /// 校验给定脚本地址是否可达（2xx 即视为可用），从不返回错误
    pub async fn validate_connection(&self, url: &str) -> bool {
        if url.trim().is_empty() {
            return false;
        }

        match self.get_with_retry(url, SheetAction::TestConnection).await {
            Ok((status, _)) if status.is_success() => {
                info!("[SheetsAPI] ✅ 脚本地址可用: {}", url);
                true
            }
            Ok((status, _)) => {
                warn!("[SheetsAPI] 脚本地址返回 {}: {}", status, url);
                false
            }
            Err(e) => {
                warn!("[SheetsAPI] 脚本地址不可达: {}, 错误: {:#}", url, e);
                false
            }
        }
    }
}

#[async_trait]
impl RemoteSource<Assignment> for SheetsApi {
    async fn fetch_all(&self) -> Result<Vec<Assignment>> {
        self.fetch_assignments().await
    }
}

#[async_trait]
impl RemoteSource<Exam> for SheetsApi {
    async fn fetch_all(&self) -> Result<Vec<Exam>> {
        self.fetch_exams().await
    }
}

#[async_trait]
impl RemoteSource<Project> for SheetsApi {
    async fn fetch_all(&self) -> Result<Vec<Project>> {
        self.fetch_projects().await
    }
}
