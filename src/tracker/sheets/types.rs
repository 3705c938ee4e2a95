//! Google Sheets 脚本接口的请求动作与响应结构

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// 反序列化数组字段，处理 null 值
pub(crate) fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 脚本支持的 `action` 查询参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetAction {
    GetAssignments,
    GetExams,
    GetProjects,
    TestConnection,
}

impl SheetAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetAction::GetAssignments => "getAssignments",
            SheetAction::GetExams => "getExams",
            SheetAction::GetProjects => "getProjects",
            SheetAction::TestConnection => "testConnection",
        }
    }
}

/// 脚本响应体：通常是裸 JSON 数组，部分部署会包一层 `data`，出错时返回 `error`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SheetPayload<T> {
    List(Vec<T>),
    Failure {
        error: String,
    },
    Wrapped {
        #[serde(deserialize_with = "deserialize_vec_or_null")]
        data: Vec<T>,
    },
}

/// 解析列表响应；`null` 视为空列表
pub fn parse_list<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>> {
    let payload: Option<SheetPayload<T>> =
        serde_json::from_slice(body).map_err(|e| anyhow!("反序列化响应失败: {}", e))?;

    match payload {
        None => Ok(Vec::new()),
        Some(SheetPayload::List(items)) => Ok(items),
        Some(SheetPayload::Wrapped { data }) => Ok(data),
        Some(SheetPayload::Failure { error }) => Err(anyhow!("脚本返回错误: {}", error)),
    }
}
